//! Reads the `---` delimited front matter of blog articles.
//!
//! ```
//! let doc = "---\nlayout: article\ntitle: Foo\ndate: 2014-10-31T22:01:36-07:00\n---\nBody";
//! let (meta, body) = article_meta::extract(doc).unwrap();
//! assert_eq!(meta.title(), "Foo");
//! assert_eq!(body, "Body");
//! ```

pub mod error;
pub mod index;
pub mod listing;
pub mod metadata;
pub mod reader;

pub use error::ExtractError;
pub use listing::{Article, Failure, FailureKind, ListOptions, Listing};
pub use metadata::ArticleMetadata;
pub use reader::extract;

/// Marker line opening and closing the metadata block.
pub const DELIMITER: &str = "---";
