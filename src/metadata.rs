//! Metadata header separation.
//!
//! Normalized documents may open with a YAML header between two `---`
//! lines:
//!
//! ```text
//! ---
//! title: On Rivers
//! author: A. Writer
//! tags: [geography, water]
//! ---
//! The body starts here.
//! ```
//!
//! The header is a convenience, not a contract. A missing header, an
//! unclosed one, or one that fails to parse all produce empty metadata and
//! leave the whole input as the body. Nothing in here returns an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// Line that opens and closes the header.
pub const DELIMITER: &str = "---";

/// Metadata parsed from a document header.
///
/// The fields chunks inherit are explicit. Anything else in the header is
/// kept as a string in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Document title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Where the document came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Canonical URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Pass-through fields, stringified.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl DocumentMetadata {
    /// Whether no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn from_mapping(mapping: serde_yaml::Mapping) -> Self {
        let mut meta = Self::default();
        for (key, value) in mapping {
            let Some(key) = key.as_str() else {
                tracing::trace!(?key, "skipping non-string metadata key");
                continue;
            };
            match key {
                "title" => meta.title = scalar(&value),
                "author" => meta.author = scalar(&value),
                "source" => meta.source = scalar(&value),
                "category" => meta.category = scalar(&value),
                "url" => meta.url = scalar(&value),
                "tags" => meta.tags = tags(&value),
                _ => match scalar(&value) {
                    Some(s) => {
                        meta.extra.insert(key.to_string(), s);
                    }
                    None => tracing::trace!(key, "skipping non-scalar metadata field"),
                },
            }
        }
        meta
    }
}

/// Split a document into its metadata header and body.
///
/// Never fails: any problem with the header yields empty metadata and the
/// entire input as the body.
///
/// ```rust
/// use seams::split_metadata;
///
/// let (meta, body) = split_metadata("---\ntitle: Notes\n---\nHello.");
/// assert_eq!(meta.title.as_deref(), Some("Notes"));
/// assert_eq!(body, "Hello.");
///
/// let (meta, body) = split_metadata("---\ntitle: never closed\nHello.");
/// assert!(meta.is_empty());
/// assert_eq!(body, "---\ntitle: never closed\nHello.");
/// ```
#[must_use]
pub fn split_metadata(document: &str) -> (DocumentMetadata, &str) {
    let Some((header, body)) = find_header(document) else {
        return (DocumentMetadata::default(), document);
    };

    if header.trim().is_empty() {
        return (DocumentMetadata::default(), body);
    }

    match serde_yaml::from_str::<Value>(header) {
        Ok(Value::Mapping(mapping)) => (DocumentMetadata::from_mapping(mapping), body),
        Ok(Value::Null) => (DocumentMetadata::default(), body),
        Ok(other) => {
            tracing::debug!(kind = value_kind(&other), "metadata header is not a mapping, ignoring it");
            (DocumentMetadata::default(), document)
        }
        Err(err) => {
            tracing::debug!(error = %err, "unparsable metadata header, ignoring it");
            (DocumentMetadata::default(), document)
        }
    }
}

/// Locate `(header, body)` when the document opens with a closed header.
fn find_header(document: &str) -> Option<(&str, &str)> {
    let mut lines = document.split_inclusive('\n');

    let first = lines.next()?;
    if !is_delimiter(first) || !first.ends_with('\n') {
        return None;
    }

    let header_start = first.len();
    let mut offset = header_start;
    for line in lines {
        if is_delimiter(line) {
            let body_start = offset + line.len();
            return Some((&document[header_start..offset], &document[body_start..]));
        }
        offset += line.len();
    }

    tracing::debug!("metadata header opened but never closed, ignoring it");
    None
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches('\n').trim_end_matches('\r') == DELIMITER
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn tags(value: &Value) -> Vec<String> {
    match value {
        Value::Sequence(items) => items.iter().filter_map(scalar).collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        other => scalar(other).into_iter().collect(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged",
    }
}

/// Render a header block for `fields`, delimiters included.
///
/// The output of `render_header(x) + body` splits back into `body` exactly.
pub(crate) fn render_header<T: Serialize>(fields: &T) -> Result<String, serde_yaml::Error> {
    let yaml = serde_yaml::to_string(fields)?;
    let mut out = String::with_capacity(yaml.len() + 2 * (DELIMITER.len() + 1));
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(&yaml);
    if !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(DELIMITER);
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_header() {
        let (meta, body) = split_metadata("Just a body.\n---\nnot: header");
        assert!(meta.is_empty());
        assert_eq!(body, "Just a body.\n---\nnot: header");
    }

    #[test]
    fn test_full_header() {
        let doc = "---\ntitle: On Rivers\nauthor: A. Writer\nsource: kindle\ncategory: books\n\
                   tags: [geography, water]\nurl: https://example.com/rivers\nyear: 1999\n---\nBody.";
        let (meta, body) = split_metadata(doc);
        assert_eq!(meta.title.as_deref(), Some("On Rivers"));
        assert_eq!(meta.author.as_deref(), Some("A. Writer"));
        assert_eq!(meta.source.as_deref(), Some("kindle"));
        assert_eq!(meta.category.as_deref(), Some("books"));
        assert_eq!(meta.tags, vec!["geography", "water"]);
        assert_eq!(meta.url.as_deref(), Some("https://example.com/rivers"));
        assert_eq!(meta.extra.get("year").map(String::as_str), Some("1999"));
        assert_eq!(body, "Body.");
    }

    #[test]
    fn test_body_is_not_trimmed() {
        let (_, body) = split_metadata("---\ntitle: x\n---\n\n  Indented.\n");
        assert_eq!(body, "\n  Indented.\n");
    }

    #[test]
    fn test_crlf_delimiters() {
        let (meta, body) = split_metadata("---\r\ntitle: x\r\n---\r\nBody");
        assert_eq!(meta.title.as_deref(), Some("x"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_unclosed_header() {
        let doc = "---\ntitle: x\nno closing line";
        let (meta, body) = split_metadata(doc);
        assert!(meta.is_empty());
        assert_eq!(body, doc);
    }

    #[test]
    fn test_delimiter_only_document() {
        let (meta, body) = split_metadata("---");
        assert!(meta.is_empty());
        assert_eq!(body, "---");
    }

    #[test]
    fn test_unparsable_header_degrades() {
        let doc = "---\ntitle: [unclosed\n---\nBody";
        let (meta, body) = split_metadata(doc);
        assert!(meta.is_empty());
        assert_eq!(body, doc);
    }

    #[test]
    fn test_non_mapping_header_degrades() {
        let doc = "---\n- a\n- b\n---\nBody";
        let (meta, body) = split_metadata(doc);
        assert!(meta.is_empty());
        assert_eq!(body, doc);
    }

    #[test]
    fn test_empty_header() {
        let (meta, body) = split_metadata("---\n---\nBody");
        assert!(meta.is_empty());
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_comma_separated_tags() {
        let (meta, _) = split_metadata("---\ntags: a, b ,, c\n---\n");
        assert_eq!(meta.tags, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_nested_extra_is_skipped() {
        let (meta, _) = split_metadata("---\nnested:\n  k: v\nflag: true\n---\n");
        assert!(!meta.extra.contains_key("nested"));
        assert_eq!(meta.extra.get("flag").map(String::as_str), Some("true"));
    }

    #[test]
    fn test_render_header_splits_back() {
        let meta = DocumentMetadata {
            title: Some("---".to_string()),
            tags: vec!["x".to_string()],
            ..DocumentMetadata::default()
        };
        let doc = format!("{}---\nbody with its own delimiter", render_header(&meta).unwrap());
        let (parsed, body) = split_metadata(&doc);
        assert_eq!(parsed, meta);
        assert_eq!(body, "---\nbody with its own delimiter");
    }
}
