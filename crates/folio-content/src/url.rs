//! Site URL normalization.

/// Prefixes of URLs that are never rewritten.
const PASSTHROUGH_PREFIXES: [&str; 5] = ["#", "//", "mailto:", "tel:", "http"];

/// The site's URL rule: prefixes local paths with the site root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SiteUrl {
    root: String,
    trailing_slash: bool,
}

impl SiteUrl {
    /// Create a URL rule for `root` (e.g. `https://example.com`, or empty).
    #[must_use]
    pub fn new(root: &str, trailing_slash: bool) -> Self {
        Self {
            root: root.trim_end_matches('/').to_owned(),
            trailing_slash,
        }
    }

    /// The site root URL without a trailing slash.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Resolve a local path to an absolute site URL.
    ///
    /// Empty strings, fragments, protocol-relative, `mailto:`, `tel:` and
    /// `http(s)` URLs are returned unchanged.
    #[must_use]
    pub fn resolve(&self, url: &str) -> String {
        if url.is_empty() || PASSTHROUGH_PREFIXES.iter().any(|p| url.starts_with(p)) {
            return url.to_owned();
        }

        let mut resolved = format!("{}/{}", self.root, url.trim_matches('/'));

        if self.trailing_slash && !resolved.ends_with('/') {
            let last = resolved.rsplit('/').next().unwrap_or_default();
            if !last.contains('.') {
                resolved.push('/');
            }
        }

        resolved
    }

    /// Strip the site root from `url`, leaving a root-relative path.
    #[must_use]
    pub fn strip_root<'a>(&self, url: &'a str) -> &'a str {
        if self.root.is_empty() {
            return url;
        }
        url.strip_prefix(self.root.as_str()).unwrap_or(url)
    }
}
