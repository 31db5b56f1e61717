//! Asset revision manifest lookup for Folio.
//!
//! An external bundler fingerprints static assets and writes a
//! `rev-manifest.json` mapping original paths to revisioned ones:
//!
//! ```json
//! { "css/site.css": "css/site-3f2a9c.css" }
//! ```
//!
//! [`AssetManifest::get`] consults that mapping only when the manifest is
//! active (production builds). In every other environment it is the
//! identity function, so templates can reference assets unconditionally.

use std::collections::HashMap;
use std::path::Path;

/// Error returned when a manifest file exists but cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// I/O error reading the manifest.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// Manifest path.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Manifest is not a JSON object of strings.
    #[error("Invalid asset manifest {path}: {source}")]
    Parse {
        /// Manifest path.
        path: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// Mapping from asset paths to their revisioned equivalents.
#[derive(Clone, Debug, Default)]
pub struct AssetManifest {
    entries: HashMap<String, String>,
    active: bool,
}

impl AssetManifest {
    /// Create a manifest that maps every path to itself.
    #[must_use]
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create an active manifest from explicit entries.
    #[must_use]
    pub fn from_entries(entries: HashMap<String, String>) -> Self {
        Self {
            entries,
            active: true,
        }
    }

    /// Load the manifest at `path`.
    ///
    /// When `active` is false, or the file does not exist, the returned
    /// manifest is the identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path, active: bool) -> Result<Self, ManifestError> {
        if !active {
            return Ok(Self::identity());
        }
        if !path.exists() {
            tracing::warn!(path = %path.display(), "No asset manifest, using identity");
            return Ok(Self {
                entries: HashMap::new(),
                active,
            });
        }

        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: display.clone(),
            source,
        })?;
        let entries: HashMap<String, String> =
            serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
                path: display,
                source,
            })?;

        tracing::debug!(path = %path.display(), entries = entries.len(), "Loaded asset manifest");
        Ok(Self { entries, active })
    }

    /// Get the revisioned path for `path`, or `path` itself.
    #[must_use]
    pub fn get<'a>(&'a self, path: &'a str) -> &'a str {
        if !self.active {
            return path;
        }
        self.entries.get(path).map_or(path, String::as_str)
    }

    /// Number of entries in the manifest.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
