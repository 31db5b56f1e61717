//! Content discovery by filesystem walking.
//!
//! The [`Scanner`] only locates candidate files and classifies them by kind;
//! no content is read at this stage. Hidden entries are skipped, and results
//! are sorted by relative path so that builds are reproducible regardless of
//! directory iteration order.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::entity::ContentKind;

/// Extensions recognized as content sources.
pub const CONTENT_EXTENSIONS: [&str; 7] = ["md", "markdown", "tx", "textile", "xml", "twig", "jinja"];

/// Location of one content source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    /// Path on disk.
    pub path: PathBuf,
    /// Path relative to the source root, forward slashes.
    pub relative: String,
    /// Last modification time.
    pub modified: DateTime<Utc>,
}

impl SourceFile {
    /// Describe the file at `path` under `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file metadata cannot be read.
    pub fn new(root: &Path, path: &Path) -> std::io::Result<Self> {
        let modified = fs::metadata(path)?.modified()?;
        let relative = path
            .strip_prefix(root)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        Ok(Self {
            path: path.to_path_buf(),
            relative,
            modified: DateTime::from(modified),
        })
    }

    /// A file that exists only in memory, for in-process construction.
    #[must_use]
    pub fn virtual_file(relative: &str, modified: DateTime<Utc>) -> Self {
        Self {
            path: PathBuf::from(relative),
            relative: relative.to_owned(),
            modified,
        }
    }

    /// File name with extension.
    #[must_use]
    pub fn filename(&self) -> &str {
        self.relative.rsplit('/').next().unwrap_or(&self.relative)
    }

    /// Directory part of the relative path, empty at the root.
    #[must_use]
    pub fn relative_dir(&self) -> &str {
        self.relative.rsplit_once('/').map_or("", |(dir, _)| dir)
    }

    /// Extension without the dot, empty if none.
    #[must_use]
    pub fn extension(&self) -> &str {
        self.filename().rsplit_once('.').map_or("", |(_, ext)| ext)
    }
}

/// Content files found under a source root, grouped by kind.
#[derive(Clone, Debug, Default)]
pub struct Discovered {
    /// Standalone pages.
    pub pages: Vec<SourceFile>,
    /// Files under `_posts`.
    pub posts: Vec<SourceFile>,
    /// Files under `_doc`.
    pub docs: Vec<SourceFile>,
}

impl Discovered {
    /// Files of one kind.
    #[must_use]
    pub fn of_kind(&self, kind: ContentKind) -> &[SourceFile] {
        match kind {
            ContentKind::Page => &self.pages,
            ContentKind::Post => &self.posts,
            ContentKind::Doc => &self.docs,
        }
    }

    /// Total number of files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len() + self.posts.len() + self.docs.len()
    }

    /// Whether nothing was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Walks a source directory and classifies content files.
pub struct Scanner {
    source_dir: PathBuf,
}

impl Scanner {
    /// Create a scanner rooted at `source_dir`.
    #[must_use]
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
        }
    }

    /// Walk the tree and return classified source files.
    ///
    /// Returns nothing if the source directory doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be read.
    pub fn scan(&self) -> std::io::Result<Discovered> {
        let mut files = Vec::new();
        if self.source_dir.is_dir() {
            self.scan_directory(&self.source_dir, &mut files)?;
        }
        files.sort_by(|a: &SourceFile, b| a.relative.cmp(&b.relative));

        let mut discovered = Discovered::default();
        for file in files {
            match ContentKind::classify(&file.relative) {
                Some(ContentKind::Page) => discovered.pages.push(file),
                Some(ContentKind::Post) => discovered.posts.push(file),
                Some(ContentKind::Doc) => discovered.docs.push(file),
                None => {}
            }
        }
        Ok(discovered)
    }

    fn scan_directory(&self, dir: &Path, files: &mut Vec<SourceFile>) -> std::io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if name.to_string_lossy().starts_with('.') {
                continue;
            }

            let path = entry.path();
            if entry.file_type()?.is_dir() {
                self.scan_directory(&path, files)?;
            } else if is_content_file(&path) {
                files.push(SourceFile::new(&self.source_dir, &path)?);
            }
        }
        Ok(())
    }
}

fn is_content_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| CONTENT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
