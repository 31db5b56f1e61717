//! Build orchestration.
//!
//! A build runs these stages in order, each to completion:
//!
//! 1. Copy static files, so templates can see them in the output
//! 2. Discover and construct pages, then posts, then docs
//! 3. Register each entity in the [`SiteGraph`]
//! 4. Sequence collections
//! 5. Render every entity in registration order and write its output(s)
//!
//! Any error aborts the build. Output already written is left in place.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use folio_assets::AssetManifest;
use folio_config::Config;
use folio_content::{ContentEntity, ContentKind, Scanner, SiteContext, SiteUrl};

use crate::context::{PageContext, SiteGlobals, entity_value};
use crate::environment::{EnvironmentOptions, create_environment};
use crate::hooks::{Hooks, RenderedOutput};
use crate::pagination::paginate;
use crate::static_files::{StaticCopier, write_output};
use crate::{SiteError, SiteGraph, TemplateResolver, sequence};

/// Counts reported after a build.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Entities registered in the graph.
    pub entities: usize,
    /// Drafts skipped in production.
    pub drafts_skipped: usize,
    /// Output files written from content.
    pub pages_written: usize,
    /// Static files copied.
    pub static_copied: usize,
}

/// Runs a full site build from a loaded configuration.
pub struct Builder {
    config: Config,
    hooks: Hooks,
    content: SiteContext,
    build_time: DateTime<Utc>,
}

impl Builder {
    /// Create a builder with default markup transforms and no hooks.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let site_url = SiteUrl::new(&config.site.url, config.site.url_trailing_slash);
        Self {
            config,
            hooks: Hooks::default(),
            content: SiteContext::new(site_url),
            build_time: Utc::now(),
        }
    }

    /// Register lifecycle hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Replace the content construction context (e.g. custom markup).
    #[must_use]
    pub fn with_content_context(mut self, content: SiteContext) -> Self {
        self.content = content;
        self
    }

    /// Fix the build time exposed as `site.time`.
    #[must_use]
    pub fn with_build_time(mut self, time: DateTime<Utc>) -> Self {
        self.build_time = time;
        self
    }

    /// Run the build.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error: a missing source directory, an
    /// unreadable or malformed content file, a template failure, an unusable
    /// asset manifest, or a filesystem error.
    pub fn build(&self) -> Result<BuildReport, SiteError> {
        let source_dir = &self.config.build_resolved.source_dir;
        let output_dir = &self.config.build_resolved.output_dir;
        if !source_dir.is_dir() {
            return Err(SiteError::SourceNotFound(source_dir.clone()));
        }
        std::fs::create_dir_all(output_dir).map_err(SiteError::io(output_dir))?;

        let manifest = AssetManifest::load(
            &self.config.assets_resolved.manifest_path,
            self.config.is_production(),
        )?;

        self.hooks.booted(&self.config);

        let mut report = BuildReport::default();
        let mut copy = self.config.build_resolved.copy.clone();
        self.hooks.before_copy(&mut copy);
        tracing::info!(paths = copy.len(), "Copying static files");
        let copier = StaticCopier::new(source_dir, output_dir, &self.config.build_resolved.exclude);
        report.static_copied = copier.copy(&copy)?;

        let mut graph = self.load(source_dir, &mut report)?;
        report.entities = graph.len();

        tracing::info!(entities = graph.len(), "Sorting collections");
        sequence(&mut graph);
        self.hooks.sorted(&graph);

        let graph = Arc::new(graph);
        report.pages_written = self.render(&graph, manifest, output_dir)?;

        self.hooks.rendered(&report);
        tracing::info!(
            entities = report.entities,
            written = report.pages_written,
            copied = report.static_copied,
            "Build complete"
        );
        Ok(report)
    }

    /// Discover, construct and register every entity.
    fn load(&self, source_dir: &Path, report: &mut BuildReport) -> Result<SiteGraph, SiteError> {
        let discovered = Scanner::new(source_dir)
            .scan()
            .map_err(SiteError::io(source_dir))?;
        let production = self.config.is_production();
        let mut graph = SiteGraph::new();

        for kind in ContentKind::ALL {
            let files = discovered.of_kind(kind);
            tracing::info!(kind = %kind, files = files.len(), "Adding content");

            for file in files {
                let entity = ContentEntity::from_file(kind, file, &self.content)?;
                if production && entity.is_draft() {
                    tracing::info!(file = %file.relative, "Skipping draft");
                    report.drafts_skipped += 1;
                    continue;
                }
                graph.add_content(entity);
            }
        }

        Ok(graph)
    }

    /// Render every entity and write outputs. Returns the number written.
    fn render(
        &self,
        graph: &Arc<SiteGraph>,
        manifest: AssetManifest,
        output_dir: &Path,
    ) -> Result<usize, SiteError> {
        let site_url = self.content.url().clone();
        let globals = SiteGlobals::new(
            &self.config.site.title,
            site_url.root(),
            self.build_time,
            &self.config.environment,
            graph,
        );
        let env = create_environment(
            TemplateResolver::new(Arc::clone(graph)),
            EnvironmentOptions {
                site_url: site_url.clone(),
                manifest: Arc::new(manifest),
                source_dir: self.config.build_resolved.source_dir.clone(),
                output_dir: output_dir.to_path_buf(),
                globals,
            },
        );

        tracing::info!("Rendering content");
        let per_page = self.config.pagination.max_per_page;
        let mut written = 0;

        for entity in graph.pages() {
            tracing::debug!(output = %entity.target, template = ?entity.template(), "Rendering");
            let template_error = |source: minijinja::Error| SiteError::Template {
                id: entity.id.clone(),
                source,
            };

            if entity.template().is_none() {
                let html = env
                    .render_named_str(&entity.id, &entity.body, ())
                    .map_err(template_error)?;
                self.write(output_dir, entity.target.clone(), html)?;
                written += 1;
                continue;
            }

            let template = env.get_template(&entity.id).map_err(template_error)?;
            let parent = graph.parent(entity).map(|p| entity_value(p, graph));
            let posts = graph.resolve_collection(entity);

            if entity.paginate {
                for group in paginate(&posts, per_page, &entity.target, &entity.url, &site_url) {
                    let mut page = entity_value(entity, graph);
                    page["url"] = serde_json::Value::String(group.url.clone());
                    let ctx = PageContext {
                        page,
                        posts: group.items.iter().map(|p| entity_value(p, graph)).collect(),
                        parent: parent.clone(),
                        pagination: Some(group.frame),
                    };
                    let html = template.render(&ctx).map_err(template_error)?;
                    self.write(output_dir, group.target, html)?;
                    written += 1;
                }
            } else {
                let ctx = PageContext {
                    page: entity_value(entity, graph),
                    posts: posts.iter().map(|p| entity_value(p, graph)).collect(),
                    parent,
                    pagination: None,
                };
                let html = template.render(&ctx).map_err(template_error)?;
                self.write(output_dir, entity.target.clone(), html)?;
                written += 1;
            }
        }

        Ok(written)
    }

    fn write(&self, output_dir: &Path, target: String, html: String) -> Result<(), SiteError> {
        let mut output = RenderedOutput { target, html };
        self.hooks.before_write(&mut output);
        write_output(output_dir, &output.target, &output.html)
    }
}

impl std::fmt::Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("environment", &self.config.environment)
            .field("hooks", &self.hooks)
            .field("build_time", &self.build_time)
            .finish_non_exhaustive()
    }
}
