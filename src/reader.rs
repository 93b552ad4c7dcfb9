//! Front-matter reader.
//!
//! A document starts with a `---` line, carries a YAML mapping, and closes
//! the block with another `---` line. Everything after the closing line is
//! the body and is handed back untouched.

use chrono::{DateTime, FixedOffset};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::{Mapping, Value};

use crate::{error::ExtractError, metadata::ArticleMetadata, DELIMITER};

static CLOSING_DELIMITER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?m)^{}\r?$", regex::escape(DELIMITER))).expect("valid delimiter regex")
});

const RECOGNIZED_KEYS: [&str; 5] = ["layout", "title", "date", "draft", "tags"];

/// Splits `document` into its metadata and the body that follows the block.
///
/// The body keeps any leading blank lines; only the line break ending the
/// closing `---` is consumed.
pub fn extract(document: &str) -> Result<(ArticleMetadata, &str), ExtractError> {
    let (block, body) = split_block(document)?;
    let fields = parse_block(block)?;
    let meta = validate(&fields)?;
    Ok((meta, body))
}

fn split_block(document: &str) -> Result<(&str, &str), ExtractError> {
    let rest = document
        .strip_prefix(DELIMITER)
        .ok_or(ExtractError::MissingMetadataBlock)?;
    let rest = if rest.is_empty() {
        return Err(ExtractError::UnterminatedMetadataBlock);
    } else if let Some(r) = rest.strip_prefix("\r\n") {
        r
    } else if let Some(r) = rest.strip_prefix('\n') {
        r
    } else {
        // `----` or `--- title` is not a delimiter line
        return Err(ExtractError::MissingMetadataBlock);
    };

    let closing = CLOSING_DELIMITER
        .find(rest)
        .ok_or(ExtractError::UnterminatedMetadataBlock)?;
    let block = &rest[..closing.start()];
    let after = &rest[closing.end()..];
    let body = after.strip_prefix('\n').unwrap_or(after);
    Ok((block, body))
}

fn parse_block(block: &str) -> Result<Mapping, ExtractError> {
    match serde_yaml::from_str::<Value>(block)? {
        Value::Mapping(m) => Ok(m),
        Value::Null => Ok(Mapping::new()),
        other => Err(ExtractError::MalformedMetadata(format!(
            "expected a mapping of keys to values, found {}",
            kind_of(&other)
        ))),
    }
}

fn validate(fields: &Mapping) -> Result<ArticleMetadata, ExtractError> {
    for key in fields.keys() {
        match key.as_str() {
            Some(k) if RECOGNIZED_KEYS.contains(&k) => {}
            _ => debug!("ignoring unrecognized front matter key {key:?}"),
        }
    }

    let layout = required_string(fields, "layout")?;
    let title = required_string(fields, "title")?;
    let date = required_date(fields, "date")?;
    let draft = optional_bool(fields, "draft")?;
    let tags = optional_tags(fields, "tags")?;

    ArticleMetadata::new(layout, title, date, draft, tags)
}

/// `null` values are treated the same as absent keys.
fn lookup<'a>(fields: &'a Mapping, key: &str) -> Option<&'a Value> {
    fields.get(key).filter(|v| !v.is_null())
}

fn required_string(fields: &Mapping, field: &'static str) -> Result<String, ExtractError> {
    let value = lookup(fields, field).ok_or_else(|| ExtractError::missing(field))?;
    let s = value.as_str().ok_or_else(|| {
        ExtractError::invalid(field, format!("expected a string, found {}", kind_of(value)))
    })?;
    if s.trim().is_empty() {
        return Err(ExtractError::invalid(field, "must not be empty"));
    }
    Ok(s.to_string())
}

fn required_date(
    fields: &Mapping,
    field: &'static str,
) -> Result<DateTime<FixedOffset>, ExtractError> {
    let value = lookup(fields, field).ok_or_else(|| ExtractError::missing(field))?;
    let s = value.as_str().ok_or_else(|| {
        ExtractError::invalid(
            field,
            format!("expected a timestamp, found {}", kind_of(value)),
        )
    })?;
    parse_date(s.trim()).map_err(|e| ExtractError::invalid(field, format!("`{s}` {e}")))
}

/// Accepts RFC 3339 and the `2014-10-31 22:01:36 -0700` form. An offset is
/// always required.
pub(crate) fn parse_date(s: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S %z"))
        .map_err(|e| format!("is not a timestamp with offset: {e}"))
}

fn optional_bool(fields: &Mapping, field: &'static str) -> Result<bool, ExtractError> {
    match lookup(fields, field) {
        None => Ok(false),
        Some(v) => v.as_bool().ok_or_else(|| {
            ExtractError::invalid(field, format!("expected a boolean, found {}", kind_of(v)))
        }),
    }
}

fn optional_tags(fields: &Mapping, field: &'static str) -> Result<Vec<String>, ExtractError> {
    let Some(value) = lookup(fields, field) else {
        return Ok(vec![]);
    };
    let seq = value.as_sequence().ok_or_else(|| {
        ExtractError::invalid(
            field,
            format!("expected a sequence of strings, found {}", kind_of(value)),
        )
    })?;

    let mut tags = Vec::with_capacity(seq.len());
    for (i, tag) in seq.iter().enumerate() {
        match tag.as_str() {
            Some(t) => {
                if tags.iter().any(|seen: &String| seen == t) {
                    debug!("duplicate tag {t:?}");
                }
                tags.push(t.to_string());
            }
            None => {
                return Err(ExtractError::invalid(
                    field,
                    format!("element {i} is {}, not a string", kind_of(tag)),
                ))
            }
        }
    }
    Ok(tags)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
