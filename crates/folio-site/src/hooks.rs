//! Build lifecycle hooks.
//!
//! Callbacks are registered explicitly on a [`Hooks`] value passed to the
//! builder and run in registration order at fixed checkpoints:
//!
//! | Checkpoint | Receives |
//! |------------|----------|
//! | `booted` | configuration, before anything is written |
//! | `before_copy` | the list of static paths to copy |
//! | `sorted` | the sequenced graph, before rendering |
//! | `before_write` | each output (target and text may be rewritten) |
//! | `rendered` | the finished build report |

use folio_config::Config;

use crate::{BuildReport, SiteGraph};

/// A rendered output about to be written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedOutput {
    /// Path relative to the output root.
    pub target: String,
    /// Rendered text.
    pub html: String,
}

/// Registered lifecycle callbacks.
#[derive(Default)]
pub struct Hooks {
    booted: Vec<Box<dyn Fn(&Config) + Send + Sync>>,
    sorted: Vec<Box<dyn Fn(&SiteGraph) + Send + Sync>>,
    before_write: Vec<Box<dyn Fn(&mut RenderedOutput) + Send + Sync>>,
    before_copy: Vec<Box<dyn Fn(&mut Vec<String>) + Send + Sync>>,
    rendered: Vec<Box<dyn Fn(&BuildReport) + Send + Sync>>,
}

impl Hooks {
    /// No callbacks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` once configuration is loaded, before discovery.
    #[must_use]
    pub fn on_booted(mut self, f: impl Fn(&Config) + Send + Sync + 'static) -> Self {
        self.booted.push(Box::new(f));
        self
    }

    /// Run `f` after sequencing, before rendering.
    #[must_use]
    pub fn on_sorted(mut self, f: impl Fn(&SiteGraph) + Send + Sync + 'static) -> Self {
        self.sorted.push(Box::new(f));
        self
    }

    /// Run `f` on every output before it is written.
    #[must_use]
    pub fn on_before_write(mut self, f: impl Fn(&mut RenderedOutput) + Send + Sync + 'static) -> Self {
        self.before_write.push(Box::new(f));
        self
    }

    /// Run `f` on the static copy list before copying.
    #[must_use]
    pub fn on_before_copy(mut self, f: impl Fn(&mut Vec<String>) + Send + Sync + 'static) -> Self {
        self.before_copy.push(Box::new(f));
        self
    }

    /// Run `f` after everything is written.
    #[must_use]
    pub fn on_rendered(mut self, f: impl Fn(&BuildReport) + Send + Sync + 'static) -> Self {
        self.rendered.push(Box::new(f));
        self
    }

    pub(crate) fn booted(&self, config: &Config) {
        for f in &self.booted {
            f(config);
        }
    }

    pub(crate) fn sorted(&self, graph: &SiteGraph) {
        for f in &self.sorted {
            f(graph);
        }
    }

    pub(crate) fn before_write(&self, output: &mut RenderedOutput) {
        for f in &self.before_write {
            f(output);
        }
    }

    pub(crate) fn before_copy(&self, paths: &mut Vec<String>) {
        for f in &self.before_copy {
            f(paths);
        }
    }

    pub(crate) fn rendered(&self, report: &BuildReport) {
        for f in &self.rendered {
            f(report);
        }
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("booted", &self.booted.len())
            .field("sorted", &self.sorted.len())
            .field("before_write", &self.before_write.len())
            .field("before_copy", &self.before_copy.len())
            .field("rendered", &self.rendered.len())
            .finish()
    }
}
