//! Entity metadata parsed from front matter.
//!
//! Metadata is an ordered mapping of string keys to arbitrary YAML values,
//! stored as JSON values so it serializes directly into template contexts.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::url::SiteUrl;

/// Keys whose values are site URLs: `url` as a word, or anything ending in `_url`.
static URL_KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\burl\b|_url\b").unwrap());

/// Ordered front matter values.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Metadata(Map<String, Value>);

impl Metadata {
    /// Parse metadata from YAML content.
    ///
    /// Empty content (or a YAML null document) yields empty metadata.
    ///
    /// # Errors
    ///
    /// Returns the YAML error message if the content is malformed or is not a mapping.
    pub fn from_yaml(content: &str) -> Result<Self, String> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        let parsed: Option<Map<String, Value>> =
            serde_yaml::from_str(trimmed).map_err(|e| format!("Invalid YAML: {e}"))?;
        Ok(Self(parsed.unwrap_or_default()))
    }

    /// Get the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Get the value for `key` when it is a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Whether `key` is set to a non-null value.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Iterate entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rewrite every URL-shaped string value through the site URL rule.
    pub fn rewrite_urls(&mut self, site_url: &SiteUrl) {
        for (key, value) in &mut self.0 {
            if !URL_KEY_RE.is_match(key) {
                continue;
            }
            if let Value::String(url) = value {
                *url = site_url.resolve(url);
            }
        }
    }
}
