use std::path::PathBuf;

use anyhow::{anyhow, bail};
use article_meta::{ListOptions, Listing};
use clap::ArgMatches;
use log::error;

#[derive(Debug)]
pub(crate) struct Context {
    pub article_dir: PathBuf,
    pub out: Option<PathBuf>,
    pub strict: bool,
    pub options: ListOptions,
}

impl Context {
    pub fn from_matches(matches: &ArgMatches) -> anyhow::Result<Self> {
        let article_dir: PathBuf = matches
            .get_one::<PathBuf>("article_dir")
            .cloned()
            .ok_or_else(|| anyhow!("article_dir is required"))?;
        if !article_dir.is_dir() {
            bail!("article_dir must be a directory: {article_dir:?}");
        }

        let out: Option<PathBuf> = matches.get_one::<PathBuf>("out").cloned();
        if out.as_ref().is_some_and(|o| o.is_dir()) {
            bail!("out must be a file path, not a directory.");
        }

        let mut options = ListOptions {
            include_drafts: matches.get_flag("drafts"),
            tag: matches.get_one::<String>("tag").cloned(),
            ..Default::default()
        };
        if let Some(exts) = matches.get_many::<String>("ext") {
            options.extensions = exts.cloned().collect();
        }

        Ok(Self {
            article_dir,
            out,
            strict: matches.get_flag("strict"),
            options,
        })
    }

    /// In strict mode any collected failure fails the run.
    pub fn check_strict(&self, listing: &Listing) -> anyhow::Result<()> {
        if !self.strict || listing.failures.is_empty() {
            return Ok(());
        }
        for failure in &listing.failures {
            error!("{}: {}", failure.path.display(), failure.kind);
        }
        bail!("{} documents failed", listing.failures.len())
    }
}
