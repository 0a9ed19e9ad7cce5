//! Pod list document parsing
//!
//! A source publishes a JSON object keyed by pod name. Two value shapes are
//! accepted and may be mixed in one document:
//!
//! ```json
//! {
//!   "qtcurl": { "url": "https://example.com/qtcurl.git", "author": "...",
//!               "description": "...", "license": "MIT" },
//!   "qtjson": "https://example.com/qtjson.git"
//! }
//! ```
//!
//! The second, bare-URL shape is the legacy format and carries no metadata.

use anyhow::{Context, Result};
use serde_json::Value;

use crate::pod::Pod;

/// Parse a pod list document.
///
/// Pods come out sorted by name. A document that is valid JSON but not an
/// object lists no pods. Fields of the wrong type read as empty.
pub fn parse_pod_list(document: &str) -> Result<Vec<Pod>> {
    let value: Value = serde_json::from_str(document).context("Invalid pod list JSON")?;

    let Value::Object(entries) = value else {
        return Ok(Vec::new());
    };

    let mut pods: Vec<Pod> = entries
        .into_iter()
        .map(|(name, entry)| match entry {
            Value::Object(meta) => {
                let field = |key: &str| {
                    meta.get(key)
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                };
                Pod {
                    url: field("url"),
                    author: field("author"),
                    description: field("description"),
                    license: field("license"),
                    website: field("website"),
                    name,
                }
            }
            legacy => Pod::new(name, legacy.as_str().unwrap_or_default()),
        })
        .collect();

    pods.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(pods)
}
