//! Content error types.

use std::path::PathBuf;

/// Errors raised while constructing content entities.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Source file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Front matter is malformed.
    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    /// Kind name outside the closed set.
    #[error("Unknown content kind: {0}")]
    UnknownKind(String),
}
