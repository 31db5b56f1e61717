//! Content entities for Folio.
//!
//! This crate turns source files into [`ContentEntity`] values:
//! - [`Scanner`]: discovers source files and classifies them by [`ContentKind`]
//! - [`front_matter`]: splits the leading YAML block from the body
//! - [`Markup`]: Markdown and Textile transforms
//! - [`SiteUrl`]: the site's URL rule
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use folio_content::{ContentEntity, Scanner, SiteContext, SiteUrl};
//!
//! let ctx = SiteContext::new(SiteUrl::new("https://example.com", false));
//! let found = Scanner::new("source").scan()?;
//! for file in &found.posts {
//!     let post = ContentEntity::from_file(folio_content::ContentKind::Post, file, &ctx)?;
//!     println!("{} -> {}", post.source_path(), post.url);
//! }
//! # Ok(())
//! # }
//! ```

mod date;
mod entity;
mod error;
pub mod front_matter;
mod html;
mod markup;
mod metadata;
mod source;
mod url;

pub use date::parse_date;
pub use entity::{
    ContentEntity, ContentKind, DocDetails, KindDetails, PostDetails, PostImage, ROOT_ID,
    SiteContext, TEMPLATE_NONE,
};
pub use error::ContentError;
pub use markup::{ContentType, Markdown, Markup, Textile};
pub use metadata::Metadata;
pub use source::{CONTENT_EXTENSIONS, Discovered, Scanner, SourceFile};
pub use url::SiteUrl;
