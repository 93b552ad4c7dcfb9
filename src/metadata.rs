use std::{borrow::Borrow, cmp::Ordering};

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::{error::ExtractError, DELIMITER};

/// Front matter of a single article.
///
/// Built only by [`crate::extract`] (or [`ArticleMetadata::new`]), so every
/// value in circulation has a non-empty layout and title.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ArticleMetadata {
    layout: String,
    title: String,
    /// Serialized as RFC 3339 through chrono's serde support.
    date: DateTime<FixedOffset>,
    draft: bool,
    tags: Vec<String>,
}

impl ArticleMetadata {
    /// Fails with `InvalidField` naming `layout` or `title` when it is blank.
    pub fn new(
        layout: impl Into<String>,
        title: impl Into<String>,
        date: DateTime<FixedOffset>,
        draft: bool,
        tags: Vec<String>,
    ) -> Result<Self, ExtractError> {
        let layout = layout.into();
        let title = title.into();
        if layout.trim().is_empty() {
            return Err(ExtractError::invalid("layout", "must not be empty"));
        }
        if title.trim().is_empty() {
            return Err(ExtractError::invalid("title", "must not be empty"));
        }
        Ok(Self {
            layout,
            title,
            date,
            draft,
            tags,
        })
    }

    pub fn layout(&self) -> &str {
        &self.layout
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn date(&self) -> DateTime<FixedOffset> {
        self.date
    }

    pub fn is_draft(&self) -> bool {
        self.draft
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Writes the record back as a delimited block, ready to be prepended
    /// to a body.
    pub fn to_front_matter(&self) -> Result<String, serde_yaml::Error> {
        let yaml = serde_yaml::to_string(self)?;
        Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n"))
    }

    /// Listing order: newest first, then by title.
    pub fn newest_first<T: Borrow<ArticleMetadata>>(a: &T, b: &T) -> Ordering {
        let (a, b) = (a.borrow(), b.borrow());
        b.date.cmp(&a.date).then_with(|| a.title.cmp(&b.title))
    }
}
