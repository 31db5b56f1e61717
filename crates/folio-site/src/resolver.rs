//! Virtual templates: content entities served as template sources.
//!
//! The template engine pulls sources by name. For a content id the resolver
//! synthesizes the source instead of reading a file:
//!
//! ```text
//! template: post            {% extends "post" %}{% block content %}<body>{% endblock %}
//! template: base::sidebar   {% extends "base" %}{% block sidebar %}<body>{% endblock %}
//! template: none            <body>
//! ```
//!
//! Resolution never touches the graph mutably and never caches, so every
//! build resolves every template afresh.

use std::sync::Arc;

use folio_content::TEMPLATE_NONE;

use crate::{SiteError, SiteGraph};

/// Block overridden when a template names no block.
pub const DEFAULT_BLOCK: &str = "content";

/// Separator between layout and block in a template declaration.
const BLOCK_SEPARATOR: &str = "::";

/// Pull-based template source for content entities.
#[derive(Clone, Debug)]
pub struct TemplateResolver {
    graph: Arc<SiteGraph>,
}

impl TemplateResolver {
    /// Create a resolver over a finalized graph.
    #[must_use]
    pub fn new(graph: Arc<SiteGraph>) -> Self {
        Self { graph }
    }

    /// Whether `id` names a content entity.
    #[must_use]
    pub fn exists(&self, id: &str) -> bool {
        self.graph.contains(id)
    }

    /// Template text for the entity `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::NotFound`] if `id` is not in the graph and
    /// [`SiteError::NoTemplate`] if the entity declares no template.
    pub fn get_source(&self, id: &str) -> Result<String, SiteError> {
        let entity = self
            .graph
            .get(id)
            .ok_or_else(|| SiteError::NotFound(id.to_owned()))?;
        let template = entity
            .template()
            .ok_or_else(|| SiteError::NoTemplate(id.to_owned()))?;

        Ok(wrap(template, &entity.body))
    }
}

/// Build template text for a declaration and body.
#[must_use]
pub fn wrap(template: &str, body: &str) -> String {
    if template == TEMPLATE_NONE {
        return body.to_owned();
    }

    let (layout, block) = template
        .split_once(BLOCK_SEPARATOR)
        .unwrap_or((template, DEFAULT_BLOCK));

    format!("{{% extends \"{layout}\" %}}{{% block {block} %}}{body}{{% endblock %}}")
}
