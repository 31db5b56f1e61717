//! Site graph: every content entity indexed by id and grouped by category.
//!
//! # Architecture
//!
//! Entities are stored in a flat `Vec<ContentEntity>` in registration order
//! with an id → index `HashMap`. Collections hold indices into that vector,
//! so the graph is the sole owner of entities and prev/next links are plain
//! ids. This provides:
//! - O(1) id lookups for the template loader and parent resolution
//! - Stable iteration order for rendering
//!
//! # Duplicate ids
//!
//! Registering an entity whose id is already present replaces the earlier
//! entity in place: the last registration wins, keeps the first one's
//! position in the page order, and the replaced entity is dropped from its
//! collection.

use std::collections::{BTreeMap, HashMap};

use folio_content::{ContentEntity, KindDetails};

/// In-memory index of a site's content.
#[derive(Debug, Default)]
pub struct SiteGraph {
    pages: Vec<ContentEntity>,
    index: HashMap<String, usize>,
    collections: BTreeMap<String, Vec<usize>>,
}

impl SiteGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity.
    ///
    /// Pages are indexed by id only. Posts and docs are also appended to the
    /// collection of their category (the empty category included).
    pub fn add_content(&mut self, entity: ContentEntity) {
        let category = match &entity.details {
            KindDetails::Page => None,
            KindDetails::Post(post) => Some(post.category.clone()),
            KindDetails::Doc(doc) => Some(doc.category.clone()),
        };

        let idx = if let Some(&existing) = self.index.get(&entity.id) {
            tracing::warn!(
                id = %entity.id,
                replaced = %self.pages[existing].source_path(),
                by = %entity.source_path(),
                "Duplicate content id, last one wins"
            );
            for members in self.collections.values_mut() {
                members.retain(|&i| i != existing);
            }
            self.collections.retain(|_, members| !members.is_empty());
            self.pages[existing] = entity;
            existing
        } else {
            let idx = self.pages.len();
            self.index.insert(entity.id.clone(), idx);
            self.pages.push(entity);
            idx
        };

        tracing::debug!(id = %self.pages[idx].id, kind = %self.pages[idx].kind(), "Added content");

        if let Some(category) = category {
            self.collections.entry(category).or_default().push(idx);
        }
    }

    /// Look up an entity by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ContentEntity> {
        self.index.get(id).map(|&i| &self.pages[i])
    }

    /// Whether an entity with `id` exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All entities in registration order.
    pub fn pages(&self) -> impl Iterator<Item = &ContentEntity> {
        self.pages.iter()
    }

    /// Number of registered entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the graph holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Category keys in sorted order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    /// Members of one collection, in collection order.
    #[must_use]
    pub fn collection(&self, category: &str) -> Vec<&ContentEntity> {
        self.collections
            .get(category)
            .map(|members| members.iter().map(|&i| &self.pages[i]).collect())
            .unwrap_or_default()
    }

    /// The collection a page lists.
    ///
    /// The collection named by the page's id, else the page's own category.
    /// Empty when neither exists.
    #[must_use]
    pub fn resolve_collection(&self, entity: &ContentEntity) -> Vec<&ContentEntity> {
        let key = if self.collections.contains_key(&entity.id) {
            Some(entity.id.as_str())
        } else {
            entity
                .category()
                .filter(|category| self.collections.contains_key(*category))
        };

        key.map(|key| self.collection(key)).unwrap_or_default()
    }

    /// The entity's parent, if it has one and it is registered.
    #[must_use]
    pub fn parent(&self, entity: &ContentEntity) -> Option<&ContentEntity> {
        entity.parent_id.as_deref().and_then(|id| self.get(id))
    }

    /// Mutable access for the sequencer: entities plus collection indices.
    pub(crate) fn parts_mut(&mut self) -> (&mut [ContentEntity], &mut BTreeMap<String, Vec<usize>>) {
        (&mut self.pages, &mut self.collections)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use folio_content::{ContentKind, SiteContext, SiteUrl, SourceFile};
    use pretty_assertions::assert_eq;

    use super::*;

    fn entity(kind: ContentKind, relative: &str, data: &str) -> ContentEntity {
        let ctx = SiteContext::new(SiteUrl::new("", false));
        let file = SourceFile::virtual_file(relative, Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        ContentEntity::parse(kind, &file, data, &ctx).unwrap()
    }

    fn ids(entities: &[&ContentEntity]) -> Vec<String> {
        entities.iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn test_pages_are_not_collected() {
        let mut graph = SiteGraph::new();
        graph.add_content(entity(ContentKind::Page, "about.md", "---\ntemplate: page\n---\n"));

        assert_eq!(graph.len(), 1);
        assert!(graph.contains("about.html"));
        assert_eq!(graph.categories().count(), 0);
    }

    #[test]
    fn test_posts_and_docs_are_collected() {
        let mut graph = SiteGraph::new();
        graph.add_content(entity(ContentKind::Post, "news/_posts/a.md", "---\ntemplate: post\n---\n"));
        graph.add_content(entity(ContentKind::Post, "_posts/b.md", "---\ntemplate: post\n---\n"));
        graph.add_content(entity(ContentKind::Doc, "_doc/guide/c.md", "---\ntemplate: doc\n---\n"));

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.categories().collect::<Vec<_>>(), vec!["", "guide", "news"]);
        assert_eq!(ids(&graph.collection("news")), vec!["news/a.html"]);
        assert_eq!(ids(&graph.collection("")), vec!["b.html"]);
        assert!(graph.get("guide/c.html").is_some());
    }

    #[test]
    fn test_duplicate_id_last_wins() {
        let mut graph = SiteGraph::new();
        graph.add_content(entity(ContentKind::Page, "first.md", "---\ntemplate: page\n---\n"));
        graph.add_content(entity(ContentKind::Post, "news/_posts/a.md", "---\ntemplate: post\ntitle: Old\n---\n"));
        graph.add_content(entity(ContentKind::Doc, "_doc/news/a.md", "---\ntemplate: doc\ntitle: New\n---\n"));

        assert_eq!(graph.len(), 2);
        let winner = graph.get("news/a.html").unwrap();
        assert_eq!(winner.title.as_deref(), Some("New"));
        assert_eq!(winner.kind(), ContentKind::Doc);
        assert_eq!(ids(&graph.collection("news")), vec!["news/a.html"]);
        assert_eq!(
            graph.pages().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            vec!["first.html", "news/a.html"]
        );
    }

    #[test]
    fn test_duplicate_id_leaves_old_collection() {
        let mut graph = SiteGraph::new();
        graph.add_content(entity(ContentKind::Post, "news/_posts/a.md", "---\ntemplate: post\n---\n"));
        graph.add_content(entity(ContentKind::Page, "news/a.md", "---\ntemplate: page\n---\n"));

        assert_eq!(graph.get("news/a.html").unwrap().kind(), ContentKind::Page);
        assert!(graph.collection("news").is_empty());
        assert_eq!(graph.categories().count(), 0);
    }

    #[test]
    fn test_resolve_collection() {
        let mut graph = SiteGraph::new();
        graph.add_content(entity(ContentKind::Page, "index.twig", "---\ntemplate: home\n---\n"));
        graph.add_content(entity(ContentKind::Page, "news/index.twig", "---\ntemplate: list\n---\n"));
        graph.add_content(entity(ContentKind::Page, "about.md", "---\ntemplate: page\n---\n"));
        graph.add_content(entity(ContentKind::Post, "_posts/root-post.md", "---\ntemplate: post\n---\n"));
        graph.add_content(entity(ContentKind::Post, "news/_posts/a.md", "---\ntemplate: post\n---\n"));
        graph.add_content(entity(ContentKind::Post, "news/_posts/b.md", "---\ntemplate: post\n---\n"));

        let root = graph.get("root").unwrap();
        assert!(graph.resolve_collection(root).is_empty());

        let root_post = graph.get("root-post.html").unwrap();
        assert_eq!(ids(&graph.resolve_collection(root_post)), vec!["root-post.html"]);

        let news = graph.get("news").unwrap();
        assert_eq!(ids(&graph.resolve_collection(news)), vec!["news/a.html", "news/b.html"]);

        let post = graph.get("news/a.html").unwrap();
        assert_eq!(ids(&graph.resolve_collection(post)), vec!["news/a.html", "news/b.html"]);

        let about = graph.get("about.html").unwrap();
        assert!(graph.resolve_collection(about).is_empty());
    }

    #[test]
    fn test_parent() {
        let mut graph = SiteGraph::new();
        graph.add_content(entity(ContentKind::Page, "guide/index.md", "---\ntemplate: page\n---\n"));
        graph.add_content(entity(ContentKind::Page, "guide/setup/index.md", "---\ntemplate: page\n---\n"));
        graph.add_content(entity(ContentKind::Page, "orphan/deep/index.md", "---\ntemplate: page\n---\n"));

        let setup = graph.get("guide/setup").unwrap();
        assert_eq!(graph.parent(setup).map(|p| p.id.as_str()), Some("guide"));

        let orphan = graph.get("orphan/deep").unwrap();
        assert_eq!(orphan.parent_id.as_deref(), Some("orphan"));
        assert!(graph.parent(orphan).is_none());

        let guide = graph.get("guide").unwrap();
        assert!(graph.parent(guide).is_none());
    }
}
