//! Static file copying and output writing.

use std::fs;
use std::path::Path;

use crate::SiteError;

/// Directory and extension names never copied; asset bundlers own them.
pub const BUNDLED_NAMES: [&str; 5] = ["js", "javascripts", "stylesheets", "less", "sass"];

/// Write `contents` to `target` under `output_dir`, creating directories.
pub fn write_output(output_dir: &Path, target: &str, contents: &str) -> Result<(), SiteError> {
    let path = output_dir.join(target.trim_start_matches('/'));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(SiteError::io(parent))?;
    }
    fs::write(&path, contents).map_err(SiteError::io(&path))
}

/// Remove everything in `output_dir` except dotfiles such as `.gitignore`.
///
/// A missing directory is not an error. Returns the number of top-level
/// entries removed.
pub fn clean_output(output_dir: &Path) -> Result<usize, SiteError> {
    if !output_dir.is_dir() {
        return Ok(0);
    }
    let mut removed = 0;
    let entries = fs::read_dir(output_dir).map_err(SiteError::io(output_dir))?;
    for entry in entries {
        let entry = entry.map_err(SiteError::io(output_dir))?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            fs::remove_dir_all(&path).map_err(SiteError::io(&path))?;
        } else {
            fs::remove_file(&path).map_err(SiteError::io(&path))?;
        }
        removed += 1;
    }
    tracing::debug!(dir = %output_dir.display(), removed, "Cleaned output");
    Ok(removed)
}

/// Copies static paths from the source root into the output root.
#[derive(Debug)]
pub struct StaticCopier<'a> {
    source_dir: &'a Path,
    output_dir: &'a Path,
    exclude: Vec<String>,
}

impl<'a> StaticCopier<'a> {
    /// Create a copier excluding [`BUNDLED_NAMES`] plus `extra_exclude`.
    #[must_use]
    pub fn new(source_dir: &'a Path, output_dir: &'a Path, extra_exclude: &[String]) -> Self {
        let exclude = BUNDLED_NAMES
            .iter()
            .map(|s| (*s).to_owned())
            .chain(extra_exclude.iter().cloned())
            .collect();
        Self {
            source_dir,
            output_dir,
            exclude,
        }
    }

    /// Copy each path (file or directory, relative to the source root).
    ///
    /// Missing paths are skipped. Returns the number of files copied.
    pub fn copy(&self, paths: &[String]) -> Result<usize, SiteError> {
        let mut copied = 0;
        for location in paths {
            let location = location.trim_matches('/');
            let source = self.source_dir.join(location);
            if source.is_dir() {
                copied += self.copy_dir(&source, location)?;
            } else if source.is_file() {
                self.copy_file(&source, location)?;
                copied += 1;
            } else {
                tracing::debug!(path = %location, "Static path not found, skipping");
            }
        }
        Ok(copied)
    }

    fn copy_dir(&self, dir: &Path, relative: &str) -> Result<usize, SiteError> {
        let mut copied = 0;
        let entries = fs::read_dir(dir).map_err(SiteError::io(dir))?;
        for entry in entries {
            let entry = entry.map_err(SiteError::io(dir))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();
            let child = format!("{relative}/{name}");

            if path.is_dir() {
                if self.exclude.contains(&name) {
                    continue;
                }
                copied += self.copy_dir(&path, &child)?;
            } else if !self.is_excluded_file(&name) {
                self.copy_file(&path, &child)?;
                copied += 1;
            }
        }
        Ok(copied)
    }

    fn copy_file(&self, source: &Path, relative: &str) -> Result<(), SiteError> {
        let target = self.output_dir.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(SiteError::io(parent))?;
        }
        fs::copy(source, &target).map_err(SiteError::io(source))?;
        tracing::debug!(path = %relative, "Copied");
        Ok(())
    }

    fn is_excluded_file(&self, name: &str) -> bool {
        name.rsplit_once('.')
            .is_some_and(|(_, ext)| self.exclude.iter().any(|e| e == ext))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, relative).unwrap();
    }

    #[test]
    fn test_write_output_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        write_output(dir.path(), "blog/page/2/index.html", "<p>2</p>").unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("blog/page/2/index.html")).unwrap(),
            "<p>2</p>"
        );
    }

    #[test]
    fn test_clean_output_keeps_dotfiles() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".gitignore");
        touch(dir.path(), "index.html");
        touch(dir.path(), "blog/page/2/index.html");

        assert_eq!(clean_output(dir.path()).unwrap(), 2);
        assert!(dir.path().join(".gitignore").is_file());
        assert!(!dir.path().join("index.html").exists());
        assert!(!dir.path().join("blog").exists());
    }

    #[test]
    fn test_clean_output_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(clean_output(&dir.path().join("nope")).unwrap(), 0);
    }

    #[test]
    fn test_copy_skips_bundled_and_excluded() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        for file in [
            "assets/img/logo.png",
            "assets/js/app.js",
            "assets/stylesheets/site.css",
            "assets/app.less",
            "assets/fonts/a.woff",
            "assets/notes.psd",
            "robots.txt",
        ] {
            touch(src.path(), file);
        }

        let copier = StaticCopier::new(src.path(), out.path(), &["psd".to_owned()]);
        let copied = copier
            .copy(&["assets".to_owned(), "robots.txt".to_owned(), "missing".to_owned()])
            .unwrap();

        assert_eq!(copied, 3);
        assert!(out.path().join("assets/img/logo.png").is_file());
        assert!(out.path().join("assets/fonts/a.woff").is_file());
        assert!(out.path().join("robots.txt").is_file());
        assert!(!out.path().join("assets/js").exists());
        assert!(!out.path().join("assets/stylesheets").exists());
        assert!(!out.path().join("assets/app.less").exists());
        assert!(!out.path().join("assets/notes.psd").exists());
    }
}
