//! Content entities: one parsed source file with derived routing fields.
//!
//! # Kinds
//!
//! Every entity shares the same base record. The kind decides which extra
//! fields are populated and how the structural marker directory is removed
//! from paths:
//!
//! | Kind | Marker | Extra fields |
//! |------|--------|--------------|
//! | [`ContentKind::Page`] | none | none |
//! | [`ContentKind::Post`] | `_posts` | category, excerpt, author, image |
//! | [`ContentKind::Doc`] | `_doc` | category, chapter |
//!
//! # Routing
//!
//! `news/_posts/launch.md` with a template becomes target `news/launch.html`,
//! URL `<site>/news/launch.html` and id `news/launch.html`. A target ending in
//! `index.html` is addressed by its directory: `blog/index.html` has id
//! `blog`, and the site root has the reserved id [`ROOT_ID`].

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::date::parse_date;
use crate::html;
use crate::markup::{ContentType, Markdown, Markup, Textile};
use crate::metadata::Metadata;
use crate::source::SourceFile;
use crate::url::SiteUrl;
use crate::ContentError;

/// Reserved id of the entity served at the site root.
pub const ROOT_ID: &str = "root";

/// Template value that disables layout wrapping.
pub const TEMPLATE_NONE: &str = "none";

/// The closed set of content kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Standalone page outside any marker directory.
    Page,
    /// Dated entry under a `_posts` directory.
    Post,
    /// Chaptered entry under a `_doc` directory.
    Doc,
}

impl ContentKind {
    /// All kinds in discovery order.
    pub const ALL: [Self; 3] = [Self::Page, Self::Post, Self::Doc];

    /// Structural marker directory name for this kind.
    #[must_use]
    pub fn marker(self) -> Option<&'static str> {
        match self {
            Self::Page => None,
            Self::Post => Some("_posts"),
            Self::Doc => Some("_doc"),
        }
    }

    /// Classify a source-relative path (forward slashes).
    ///
    /// Files under `_posts` are posts, files under `_doc` are docs, and files
    /// under any other `_`-prefixed directory belong to no kind.
    #[must_use]
    pub fn classify(relative: &str) -> Option<Self> {
        let mut dirs = relative.split('/').collect::<Vec<_>>();
        dirs.pop();

        if dirs.contains(&"_posts") {
            Some(Self::Post)
        } else if dirs.contains(&"_doc") {
            Some(Self::Doc)
        } else if dirs.iter().any(|d| d.starts_with('_')) {
            None
        } else {
            Some(Self::Page)
        }
    }

    /// Remove this kind's marker segment from a forward-slash path.
    #[must_use]
    pub fn clean_path(self, path: &str) -> String {
        match self.marker() {
            None => path.trim_matches('/').to_owned(),
            Some(marker) => path
                .split('/')
                .filter(|segment| !segment.is_empty() && *segment != marker)
                .collect::<Vec<_>>()
                .join("/"),
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Page => "page",
            Self::Post => "post",
            Self::Doc => "doc",
        };
        f.write_str(name)
    }
}

impl FromStr for ContentKind {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "page" => Ok(Self::Page),
            "post" => Ok(Self::Post),
            "doc" => Ok(Self::Doc),
            other => Err(ContentError::UnknownKind(other.to_owned())),
        }
    }
}

/// Responsive variants of a post's lead image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PostImage {
    /// Image as declared.
    pub full: String,
    /// `name-medium.ext` variant.
    pub medium: String,
    /// `name-thumb.ext` variant.
    pub thumb: String,
}

impl PostImage {
    fn from_path(full: &str) -> Self {
        let variant = |size: &str| {
            let path = Path::new(full);
            let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
            let name = match path.extension() {
                Some(ext) => format!("{stem}-{size}.{}", ext.to_string_lossy()),
                None => format!("{stem}-{size}"),
            };
            match full.rfind('/') {
                Some(pos) => format!("{}/{name}", &full[..pos]),
                None => name,
            }
        };
        Self {
            full: full.to_owned(),
            medium: variant("medium"),
            thumb: variant("thumb"),
        }
    }
}

/// Fields specific to posts.
#[derive(Clone, Debug, PartialEq)]
pub struct PostDetails {
    /// Collection key (cleaned directory).
    pub category: String,
    /// Teaser HTML.
    pub excerpt: String,
    /// Author name, `unknown` unless declared.
    pub author: String,
    /// Lead image variants, when declared.
    pub image: Option<PostImage>,
}

/// Fields specific to docs.
#[derive(Clone, Debug, PartialEq)]
pub struct DocDetails {
    /// Collection key (cleaned directory).
    pub category: String,
    /// Ordering number within the collection.
    pub chapter: f64,
}

/// Kind-specific part of an entity.
#[derive(Clone, Debug, PartialEq)]
pub enum KindDetails {
    /// Page: no extra fields.
    Page,
    /// Post fields.
    Post(PostDetails),
    /// Doc fields.
    Doc(DocDetails),
}

/// Construction context: the site URL rule and markup transforms.
pub struct SiteContext {
    url: SiteUrl,
    markdown: Box<dyn Markup>,
    textile: Box<dyn Markup>,
}

impl SiteContext {
    /// Create a context with the default Markdown and Textile transforms.
    #[must_use]
    pub fn new(url: SiteUrl) -> Self {
        Self {
            url,
            markdown: Box::new(Markdown::default()),
            textile: Box::new(Textile),
        }
    }

    /// Replace the Markdown transform.
    #[must_use]
    pub fn with_markdown(mut self, markdown: impl Markup + 'static) -> Self {
        self.markdown = Box::new(markdown);
        self
    }

    /// Replace the Textile transform.
    #[must_use]
    pub fn with_textile(mut self, textile: impl Markup + 'static) -> Self {
        self.textile = Box::new(textile);
        self
    }

    /// The site URL rule.
    #[must_use]
    pub fn url(&self) -> &SiteUrl {
        &self.url
    }

    /// Render `raw` with the transform for `content_type`.
    #[must_use]
    pub fn render(&self, content_type: ContentType, raw: &str) -> String {
        match content_type {
            ContentType::Markdown => self.markdown.render(raw),
            ContentType::Textile => self.textile.render(raw),
            ContentType::Template => raw.to_owned(),
        }
    }
}

impl fmt::Debug for SiteContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteContext")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// One parsed content file.
#[derive(Clone, Debug, PartialEq)]
pub struct ContentEntity {
    /// Unique key: URL path without surrounding slashes, or [`ROOT_ID`].
    pub id: String,
    /// Kind-specific fields.
    pub details: KindDetails,
    /// Source directory relative to the source root (forward slashes).
    pub source_dir: String,
    /// Source file name.
    pub filename: String,
    /// Transform that produced `body`.
    pub content_type: ContentType,
    /// Body text as written, without front matter.
    pub raw_body: String,
    /// Body after markup rendering (and comment stripping for posts).
    pub body: String,
    /// Front matter values, URL-shaped values already resolved.
    pub metadata: Metadata,
    /// Output path relative to the output root (forward slashes).
    pub target: String,
    /// Absolute site URL.
    pub url: String,
    /// Id of the grandparent directory's entity, if not the site root.
    pub parent_id: Option<String>,
    /// Title from metadata.
    pub title: Option<String>,
    /// Explicit description, or first paragraph text, or empty.
    pub description: String,
    /// Declared date, or the file modification time.
    pub date: DateTime<Utc>,
    /// Whether the entity renders as a paginated stream.
    pub paginate: bool,
    /// Newer neighbor in the collection (set by sequencing).
    pub next: Option<String>,
    /// Older neighbor in the collection (set by sequencing).
    pub prev: Option<String>,
}

impl ContentEntity {
    /// Read and construct an entity from a source file.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Io`] if the file cannot be read and
    /// [`ContentError::Parse`] if its front matter is malformed.
    pub fn from_file(
        kind: ContentKind,
        file: &SourceFile,
        ctx: &SiteContext,
    ) -> Result<Self, ContentError> {
        let data = std::fs::read_to_string(&file.path).map_err(|source| ContentError::Io {
            path: file.path.clone(),
            source,
        })?;
        Self::parse(kind, file, &data, ctx)
    }

    /// Construct an entity from already-read file text.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Parse`] if the front matter is malformed.
    pub fn parse(
        kind: ContentKind,
        file: &SourceFile,
        data: &str,
        ctx: &SiteContext,
    ) -> Result<Self, ContentError> {
        let (meta_text, raw_body) = crate::front_matter::split(data);

        let mut metadata = Metadata::from_yaml(meta_text).map_err(|message| ContentError::Parse {
            path: file.relative.clone(),
            message,
        })?;

        let extension = file.extension();
        let content_type = ContentType::for_extension(extension);
        let mut body = ctx.render(content_type, raw_body);

        metadata.rewrite_urls(ctx.url());

        let target = target_path(kind, &file.relative, extension, &metadata);
        let (id, url_path) = route(&target);
        let url = ctx.url().resolve(&url_path);
        let parent_id = parent_id(&target);
        let paginate = metadata.has("paginate");
        let title = metadata.get_str("title").map(str::to_owned);

        let description = match metadata.get_str("description") {
            Some(explicit) => explicit.to_owned(),
            None => html::first_paragraph(&body).unwrap_or_default(),
        };

        // Pages are dated by their file; only posts and docs honour `date`.
        let date = match metadata.get("date").filter(|_| kind != ContentKind::Page) {
            Some(value) => parse_date(value).unwrap_or_else(|| {
                tracing::warn!(
                    file = %file.relative,
                    value = %value,
                    "Unrecognized date, using file modification time"
                );
                file.modified
            }),
            None => file.modified,
        };

        let source_dir = file.relative_dir().to_owned();
        let details = match kind {
            ContentKind::Page => KindDetails::Page,
            ContentKind::Post => {
                let excerpt = match metadata.get_str("excerpt") {
                    Some(explicit) => explicit.to_owned(),
                    None => html::marked_excerpt(&body).unwrap_or_else(|| description.clone()),
                };
                body = html::strip_comments(&body);
                KindDetails::Post(PostDetails {
                    category: kind.clean_path(&source_dir),
                    excerpt,
                    author: metadata
                        .get_str("author")
                        .unwrap_or("unknown")
                        .to_owned(),
                    image: metadata.get_str("image").map(PostImage::from_path),
                })
            }
            ContentKind::Doc => KindDetails::Doc(DocDetails {
                category: kind.clean_path(&source_dir),
                chapter: metadata.get("chapter").map_or(0.0, chapter_number),
            }),
        };

        Ok(Self {
            id,
            details,
            source_dir,
            filename: file.filename().to_owned(),
            content_type,
            raw_body: raw_body.to_owned(),
            body,
            metadata,
            target,
            url,
            parent_id,
            title,
            description,
            date,
            paginate,
            next: None,
            prev: None,
        })
    }

    /// The entity's kind.
    #[must_use]
    pub fn kind(&self) -> ContentKind {
        match self.details {
            KindDetails::Page => ContentKind::Page,
            KindDetails::Post(_) => ContentKind::Post,
            KindDetails::Doc(_) => ContentKind::Doc,
        }
    }

    /// Collection key for posts and docs; `None` for pages.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        match &self.details {
            KindDetails::Page => None,
            KindDetails::Post(post) => Some(&post.category),
            KindDetails::Doc(doc) => Some(&doc.category),
        }
    }

    /// Chapter number for docs.
    #[must_use]
    pub fn chapter(&self) -> Option<f64> {
        match &self.details {
            KindDetails::Doc(doc) => Some(doc.chapter),
            _ => None,
        }
    }

    /// Declared template, if any (`none` included).
    #[must_use]
    pub fn template(&self) -> Option<&str> {
        self.metadata.get_str("template")
    }

    /// Whether the entity is marked `status: draft`.
    #[must_use]
    pub fn is_draft(&self) -> bool {
        self.metadata.get_str("status") == Some("draft")
    }

    /// Source path relative to the source root, for diagnostics.
    #[must_use]
    pub fn source_path(&self) -> String {
        if self.source_dir.is_empty() {
            self.filename.clone()
        } else {
            format!("{}/{}", self.source_dir, self.filename)
        }
    }

    /// Metadata value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }
}

/// Output path: the kind's clean path with the extension swapped to `html`
/// for templated entities.
fn target_path(kind: ContentKind, relative: &str, extension: &str, metadata: &Metadata) -> String {
    let cleaned = kind.clean_path(relative);
    let templated = metadata
        .get_str("template")
        .is_some_and(|template| template != TEMPLATE_NONE);
    if !templated || extension.is_empty() {
        return cleaned;
    }

    let stem = cleaned
        .strip_suffix(extension)
        .and_then(|s| s.strip_suffix('.'))
        .unwrap_or(&cleaned);
    format!("{stem}.html")
}

/// Compute `(id, url_path)` from a target path.
fn route(target: &str) -> (String, String) {
    let normalized = target.replace('\\', "/").replace("//", "/");
    let mut url_path = format!("/{}", normalized.trim_matches('/'));
    if let Some(stripped) = url_path.strip_suffix("index.html") {
        url_path = stripped.to_owned();
    }

    let trimmed = url_path.trim_matches('/');
    let id = if trimmed.is_empty() {
        ROOT_ID.to_owned()
    } else {
        trimmed.to_owned()
    };
    (id, url_path)
}

/// Grandparent directory of the target, unless it is the site root.
fn parent_id(target: &str) -> Option<String> {
    let grandparent = Path::new(target).parent()?.parent()?;
    let grandparent = grandparent.to_string_lossy().replace('\\', "/");
    let grandparent = grandparent.trim_matches('/');
    if grandparent.is_empty() || grandparent == "." {
        None
    } else {
        Some(grandparent.to_owned())
    }
}

/// Numeric chapter from an integer, float or numeric string.
fn chapter_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0.0,
    }
}
