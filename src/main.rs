use std::path::PathBuf;

use anyhow::Context as _;
use article_meta::{index::write_index, Listing};
use clap::{command, Arg, ArgAction, Command};
use context::Context;

mod context;

fn cli() -> Command {
    command!().args(&[
        Arg::new("article_dir")
            .help("Directory path of articles")
            .env("ARTICLE_DIR")
            .value_parser(clap::value_parser!(PathBuf))
            .default_value("posts"),
        Arg::new("out")
            .long("out")
            .short('o')
            .help("Write the JSON index to this file instead of stdout")
            .value_parser(clap::value_parser!(PathBuf)),
        Arg::new("drafts")
            .long("drafts")
            .help("Include articles marked `draft: true`")
            .action(ArgAction::SetTrue),
        Arg::new("tag")
            .long("tag")
            .short('t')
            .help("Only list articles carrying this tag"),
        Arg::new("ext")
            .long("ext")
            .help("File extension treated as an article (repeatable) [default: md, markdown, html]")
            .action(ArgAction::Append),
        Arg::new("strict")
            .long("strict")
            .help("Fail if any document has missing or invalid front matter")
            .action(ArgAction::SetTrue),
    ])
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let ctx = Context::from_matches(&cli().get_matches())?;

    let listing = Listing::collect(&ctx.article_dir, &ctx.options)
        .with_context(|| format!("while listing {:?}", ctx.article_dir))?;
    write_index(ctx.out.as_deref(), &listing).context("while writing index")?;

    ctx.check_strict(&listing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn context_from_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let matches = cli().get_matches_from([
            "article-meta",
            dir.path().to_str().unwrap(),
            "--drafts",
            "--tag",
            "CSS",
            "--ext",
            "md",
            "--ext",
            "txt",
        ]);
        let ctx = Context::from_matches(&matches).unwrap();

        assert_eq!(ctx.article_dir, dir.path());
        assert!(ctx.options.include_drafts);
        assert_eq!(ctx.options.tag.as_deref(), Some("CSS"));
        assert_eq!(ctx.options.extensions, ["md", "txt"]);
        assert!(!ctx.strict);
        assert!(ctx.out.is_none());
    }

    #[test]
    fn article_dir_defaults_to_posts() {
        let cmd = cli();
        let arg = cmd
            .get_arguments()
            .find(|a| a.get_id() == "article_dir")
            .unwrap();
        let defaults: Vec<_> = arg.get_default_values().iter().map(|v| v.to_str()).collect();
        assert_eq!(defaults, [Some("posts")]);
        assert_eq!(arg.get_env(), Some(std::ffi::OsStr::new("ARTICLE_DIR")));
    }

    #[test]
    fn article_dir_from_environment() {
        let dir = tempfile::tempdir().unwrap();
        // the only test that touches ARTICLE_DIR
        std::env::set_var("ARTICLE_DIR", dir.path());
        let matches = cli().get_matches_from(["article-meta"]);
        std::env::remove_var("ARTICLE_DIR");

        let ctx = Context::from_matches(&matches).unwrap();
        assert_eq!(ctx.article_dir, dir.path());
    }

    #[test]
    fn strict_mode_fails_on_collected_failures() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("good.md"),
            "---\nlayout: article\ntitle: Foo\ndate: 2014-10-31T22:01:36-07:00\n---\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.md"), "no front matter").unwrap();
        let path = dir.path().to_str().unwrap();

        let lenient =
            Context::from_matches(&cli().get_matches_from(["article-meta", path])).unwrap();
        let listing = Listing::collect(&lenient.article_dir, &lenient.options).unwrap();
        assert_eq!(listing.failures.len(), 1);
        assert!(lenient.check_strict(&listing).is_ok());

        let strict =
            Context::from_matches(&cli().get_matches_from(["article-meta", path, "--strict"]))
                .unwrap();
        assert!(strict.strict);
        let err = strict.check_strict(&listing).unwrap_err();
        assert_eq!(err.to_string(), "1 documents failed");

        std::fs::remove_file(dir.path().join("broken.md")).unwrap();
        let listing = Listing::collect(&strict.article_dir, &strict.options).unwrap();
        assert!(strict.check_strict(&listing).is_ok());
    }

    #[test]
    fn context_rejects_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("posts");
        let matches = cli().get_matches_from(["article-meta", missing.to_str().unwrap()]);
        assert!(Context::from_matches(&matches).is_err());
    }
}
