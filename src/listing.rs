//! Directory-wide article listing built on top of [`crate::extract`].
//!
//! One broken document never stops the walk: it is recorded as a
//! [`Failure`] and the remaining files are still read.

use std::{
    collections::{BTreeMap, VecDeque},
    fmt::Display,
    fs::DirEntry,
    io,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};
use serde::{Serialize, Serializer};

use crate::{error::ExtractError, metadata::ArticleMetadata, reader::extract};

#[derive(Debug, Clone)]
pub struct ListOptions {
    pub include_drafts: bool,
    /// Keep only articles carrying this tag.
    pub tag: Option<String>,
    /// File extensions treated as articles, without the leading dot.
    pub extensions: Vec<String>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            include_drafts: false,
            tag: None,
            extensions: ["md", "markdown", "html"].map(String::from).to_vec(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Article {
    /// Relative to the article directory.
    pub path: PathBuf,
    pub meta: ArticleMetadata,
    pub body: String,
}

#[derive(Serialize, Debug)]
pub struct Failure {
    #[serde(serialize_with = "serialize_path")]
    pub path: PathBuf,
    #[serde(rename = "error", serialize_with = "serialize_display")]
    pub kind: FailureKind,
}

#[derive(Debug)]
pub enum FailureKind {
    Read(io::Error),
    Extract(ExtractError),
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Read(e) => write!(f, "could not read: {e}"),
            FailureKind::Extract(e) => write!(f, "{e}"),
        }
    }
}

fn serialize_display<T: Display, S: Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(value)
}

/// File names are not always UTF-8; those are written lossily instead of
/// failing the whole index.
fn serialize_path<P: AsRef<Path>, S: Serializer>(path: &P, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&path.as_ref().display())
}

#[derive(Serialize, Debug)]
pub struct ArticleSummary<'a> {
    #[serde(serialize_with = "serialize_path")]
    pub path: &'a Path,
    #[serde(flatten)]
    pub meta: &'a ArticleMetadata,
}

#[derive(Debug, Default)]
pub struct Listing {
    /// Newest first.
    pub articles: Vec<Article>,
    pub failures: Vec<Failure>,
    /// Tag to indices into `articles`.
    pub tags: BTreeMap<String, Vec<usize>>,
}

impl Listing {
    /// Walks `article_dir` breadth first and extracts every article file.
    ///
    /// Only an unreadable `article_dir` is returned as an error; problems
    /// with nested directories and files end up in [`Listing::failures`].
    pub fn collect(article_dir: &Path, options: &ListOptions) -> io::Result<Listing> {
        let mut listing = Listing::default();
        let mut q = VecDeque::new();

        for entry in read_dir_sorted(article_dir)? {
            listing.visit(article_dir, Path::new(""), entry, options, &mut q);
        }
        while let Some(path) = q.pop_front() {
            listing.walk_dir(article_dir, &path, options, &mut q);
        }

        listing.articles.sort_by(|a, b| ArticleMetadata::newest_first(&a.meta, &b.meta));
        listing.index_tags();

        info!(
            "{} articles, {} failures under {article_dir:?}",
            listing.articles.len(),
            listing.failures.len()
        );
        Ok(listing)
    }

    fn walk_dir(
        &mut self,
        article_dir: &Path,
        path: &Path,
        options: &ListOptions,
        q: &mut VecDeque<PathBuf>,
    ) {
        match read_dir_sorted(&article_dir.join(path)) {
            Ok(entries) => {
                for entry in entries {
                    self.visit(article_dir, path, entry, options, q);
                }
            }
            Err(e) => self.fail(path.to_path_buf(), FailureKind::Read(e)),
        }
    }

    fn visit(
        &mut self,
        article_dir: &Path,
        path: &Path,
        entry: DirEntry,
        options: &ListOptions,
        q: &mut VecDeque<PathBuf>,
    ) {
        let relative = path.join(entry.file_name());
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(e) => return self.fail(relative, FailureKind::Read(e)),
        };
        if file_type.is_dir() {
            q.push_back(relative);
        } else if file_type.is_file() && is_article(&relative, &options.extensions) {
            self.read_one(article_dir, relative, options);
        } else {
            debug!("skipping {relative:?}");
        }
    }

    fn read_one(&mut self, article_dir: &Path, path: PathBuf, options: &ListOptions) {
        let content = match std::fs::read_to_string(article_dir.join(&path)) {
            Ok(c) => c,
            Err(e) => return self.fail(path, FailureKind::Read(e)),
        };
        let (meta, body) = match extract(&content) {
            Ok(extracted) => extracted,
            Err(e) => return self.fail(path, FailureKind::Extract(e)),
        };

        if meta.is_draft() && !options.include_drafts {
            debug!("skipping draft {path:?}");
            return;
        }
        if let Some(tag) = &options.tag {
            if !meta.has_tag(tag) {
                return;
            }
        }

        let body = body.to_string();
        self.articles.push(Article { path, meta, body });
    }

    fn fail(&mut self, path: PathBuf, kind: FailureKind) {
        warn!("{path:?}: {kind}");
        self.failures.push(Failure { path, kind });
    }

    fn index_tags(&mut self) {
        self.tags.clear();
        for (i, article) in self.articles.iter().enumerate() {
            for tag in article.meta.tags() {
                let entries = self.tags.entry(tag.to_string()).or_default();
                if entries.last() != Some(&i) {
                    entries.push(i);
                }
            }
        }
    }

    pub fn summaries(&self) -> Vec<ArticleSummary<'_>> {
        self.articles
            .iter()
            .map(|a| ArticleSummary {
                path: &a.path,
                meta: &a.meta,
            })
            .collect()
    }

    pub fn tagged(&self, tag: &str) -> impl Iterator<Item = &Article> {
        self.tags
            .get(tag)
            .into_iter()
            .flatten()
            .map(|&i| &self.articles[i])
    }
}

fn read_dir_sorted(dir: &Path) -> io::Result<Vec<DirEntry>> {
    let mut entries = std::fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

fn is_article(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
}
