use std::{
    collections::BTreeMap,
    fs::OpenOptions,
    io::{self, BufWriter, Write},
    path::Path,
};

use log::info;
use serde::Serialize;

use crate::listing::{ArticleSummary, Failure, Listing};

#[derive(Serialize, Debug)]
struct IndexData<'a> {
    articles: Vec<ArticleSummary<'a>>,
    tags: &'a BTreeMap<String, Vec<usize>>,
    failures: &'a [Failure],
}

/// Writes `listing` as pretty JSON to `destination`, or to stdout.
pub fn write_index(destination: Option<&Path>, listing: &Listing) -> io::Result<()> {
    match destination {
        Some(path) => {
            let fd = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)?;
            write_index_to(BufWriter::new(fd), listing)?;
            info!("index written to {path:?}");
            Ok(())
        }
        None => write_index_to(io::stdout().lock(), listing),
    }
}

pub fn write_index_to<W: Write>(mut writer: W, listing: &Listing) -> io::Result<()> {
    let data = IndexData {
        articles: listing.summaries(),
        tags: &listing.tags,
        failures: &listing.failures,
    };
    serde_json::to_writer_pretty(&mut writer, &data)?;
    writeln!(writer)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::listing::ListOptions;

    #[test]
    fn index_lists_summaries_tags_and_failures() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a.md"),
            "---\nlayout: article\ntitle: Foo\ndate: 2014-10-31T22:01:36-07:00\ntags: [CSS]\n---\nBody",
        )
        .unwrap();
        std::fs::write(dir.path().join("b.md"), "---\nlayout: article\n").unwrap();

        let listing = Listing::collect(dir.path(), &ListOptions::default()).unwrap();
        let mut out = Vec::new();
        write_index_to(&mut out, &listing).unwrap();
        let json: Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(json["articles"][0]["path"], "a.md");
        assert_eq!(json["articles"][0]["title"], "Foo");
        assert_eq!(json["articles"][0]["date"], "2014-10-31T22:01:36-07:00");
        assert_eq!(json["articles"][0]["draft"], false);
        assert!(json["articles"][0].get("body").is_none());
        assert_eq!(json["tags"]["CSS"][0], 0);
        assert_eq!(json["failures"][0]["path"], "b.md");
        assert_eq!(
            json["failures"][0]["error"],
            "metadata block is not closed by a `---` line"
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_file_names_do_not_break_the_index() {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

        let dir = tempfile::tempdir().unwrap();
        let doc = "---\nlayout: article\ntitle: Foo\ndate: 2014-10-31T22:01:36-07:00\n---\n";
        std::fs::write(dir.path().join("good.md"), doc).unwrap();
        std::fs::write(dir.path().join(OsStr::from_bytes(b"bad\xff.md")), doc).unwrap();
        std::fs::write(dir.path().join(OsStr::from_bytes(b"worse\xfe.md")), "no block").unwrap();

        let listing = Listing::collect(dir.path(), &ListOptions::default()).unwrap();
        assert_eq!(listing.articles.len(), 2);
        assert_eq!(listing.failures.len(), 1);

        let mut out = Vec::new();
        write_index_to(&mut out, &listing).unwrap();
        let json: Value = serde_json::from_slice(&out).unwrap();

        let paths: Vec<_> = json["articles"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["path"].as_str().unwrap().to_string())
            .collect();
        assert!(paths.contains(&"good.md".to_string()));
        assert!(paths.contains(&"bad\u{fffd}.md".to_string()));
        assert_eq!(json["failures"][0]["path"], "worse\u{fffd}.md");
    }

    #[test]
    fn index_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("index.json");
        std::fs::write(&out, "x".repeat(4096)).unwrap();

        write_index(Some(&out), &Listing::default()).unwrap();
        let json: Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(json["articles"], Value::Array(vec![]));
    }
}
