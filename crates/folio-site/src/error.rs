//! Site build error types.

use std::path::PathBuf;

use folio_assets::ManifestError;
use folio_content::ContentError;

/// Errors that abort a build.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Template resolution for an id absent from the graph.
    #[error("Cannot find content \"{0}\"")]
    NotFound(String),

    /// Template resolution for an entity with no template.
    #[error("Content \"{0}\" does not have a template")]
    NoTemplate(String),

    /// Template loading or rendering failed.
    #[error("Failed to render \"{id}\": {source}")]
    Template {
        id: String,
        #[source]
        source: minijinja::Error,
    },

    /// A content file could not be read or parsed.
    #[error(transparent)]
    Content(#[from] ContentError),

    /// The asset manifest could not be loaded.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Source directory does not exist.
    #[error("Source folder not found at {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Filesystem operation failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SiteError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
