//! Template context values.
//!
//! Entities are exposed to templates as maps: every front matter key, then
//! the derived fields on top (derived fields win on conflicts). Prev/next
//! and parent are resolved through the graph into small link maps.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value, json};

use folio_content::{ContentEntity, KindDetails};

use crate::SiteGraph;

/// The `site` global.
#[derive(Clone, Debug, Serialize)]
pub struct SiteGlobals {
    /// Site title.
    pub title: String,
    /// Site root URL.
    pub url: String,
    /// Build start time.
    pub time: String,
    /// Build environment name.
    pub environment: String,
    /// Every collection by category, in sequenced order.
    pub categories: Map<String, Value>,
    /// Every entity by id.
    pub pages: Map<String, Value>,
}

impl SiteGlobals {
    /// Collect globals after sequencing.
    #[must_use]
    pub fn new(
        title: &str,
        url: &str,
        time: DateTime<Utc>,
        environment: &str,
        graph: &SiteGraph,
    ) -> Self {
        let categories = graph
            .categories()
            .map(|category| {
                let members = graph
                    .collection(category)
                    .into_iter()
                    .map(|e| entity_value(e, graph))
                    .collect();
                (category.to_owned(), Value::Array(members))
            })
            .collect();
        let pages = graph
            .pages()
            .map(|e| (e.id.clone(), entity_value(e, graph)))
            .collect();

        Self {
            title: title.to_owned(),
            url: url.to_owned(),
            time: format_date(&time),
            environment: environment.to_owned(),
            categories,
            pages,
        }
    }
}

/// Render context for one entity.
#[derive(Debug, Serialize)]
pub struct PageContext {
    /// The entity being rendered.
    pub page: Value,
    /// Its resolved collection, or the current slice when paginated.
    pub posts: Vec<Value>,
    /// Its parent entity.
    pub parent: Option<Value>,
    /// Pagination data for paginated renders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<crate::PaginationFrame>,
}

/// Full map view of an entity.
#[must_use]
pub fn entity_value(entity: &ContentEntity, graph: &SiteGraph) -> Value {
    let mut map: Map<String, Value> = entity
        .metadata
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    map.insert("id".to_owned(), json!(entity.id));
    map.insert("kind".to_owned(), json!(entity.kind()));
    map.insert("type".to_owned(), json!(entity.content_type));
    map.insert("title".to_owned(), json!(entity.title));
    map.insert("url".to_owned(), json!(entity.url));
    map.insert("target".to_owned(), json!(entity.target));
    map.insert("filename".to_owned(), json!(entity.filename));
    map.insert("source_path".to_owned(), json!(entity.source_path()));
    map.insert("date".to_owned(), json!(format_date(&entity.date)));
    map.insert("description".to_owned(), json!(entity.description));
    map.insert("content".to_owned(), json!(entity.body));
    map.insert("paginate".to_owned(), json!(entity.paginate));
    map.insert("parent_id".to_owned(), json!(entity.parent_id));
    map.insert("next".to_owned(), link(entity.next.as_deref(), graph));
    map.insert("prev".to_owned(), link(entity.prev.as_deref(), graph));

    match &entity.details {
        KindDetails::Page => {}
        KindDetails::Post(post) => {
            map.insert("category".to_owned(), json!(post.category));
            map.insert("excerpt".to_owned(), json!(post.excerpt));
            map.insert("author".to_owned(), json!(post.author));
            map.insert("image".to_owned(), json!(post.image));
        }
        KindDetails::Doc(doc) => {
            map.insert("category".to_owned(), json!(doc.category));
            // An authored chapter is already in the map as written.
            if !entity.metadata.has("chapter") {
                map.insert("chapter".to_owned(), json!(0));
            }
        }
    }

    Value::Object(map)
}

/// Short view of a linked entity: id, url, title.
fn link(id: Option<&str>, graph: &SiteGraph) -> Value {
    id.and_then(|id| graph.get(id)).map_or(Value::Null, |e| {
        json!({
            "id": e.id,
            "url": e.url,
            "title": e.title,
        })
    })
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}
