//! Site graph, sequencing and rendering for Folio.
//!
//! This crate provides:
//! - [`SiteGraph`]: content entities by id and by category
//! - [`sequence`]: collection ordering and prev/next links
//! - [`paginate`]: splitting a collection into page groups
//! - [`TemplateResolver`]: content entities as virtual templates
//! - [`Builder`]: the full build pipeline
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use folio_config::Config;
//! use folio_site::Builder;
//!
//! let config = Config::load(None, None)?;
//! let report = Builder::new(config).build()?;
//! println!("{} pages written", report.pages_written);
//! # Ok(())
//! # }
//! ```

mod builder;
mod context;
mod environment;
mod error;
mod graph;
mod hooks;
mod pagination;
mod resolver;
mod sequencer;
mod share;
mod static_files;

pub use builder::{BuildReport, Builder};
pub use context::{PageContext, SiteGlobals, entity_value};
pub use environment::{EnvironmentOptions, TEMPLATE_EXTENSIONS, create_environment};
pub use error::SiteError;
pub use graph::SiteGraph;
pub use hooks::{Hooks, RenderedOutput};
pub use pagination::{PageGroup, PaginationFrame, paginate};
pub use resolver::{DEFAULT_BLOCK, TemplateResolver, wrap};
pub use sequencer::sequence;
pub use share::{SHARE_NETWORKS, share_link};
pub use static_files::{BUNDLED_NAMES, StaticCopier, clean_output, write_output};
