//! Collection ordering and prev/next adjacency.
//!
//! Docs are ordered by ascending chapter; everything else newest first.
//! After sorting, `next` points toward index 0 (newer) and `prev` away from
//! it (older), matching the chronological meaning templates rely on.

use std::cmp::Ordering;

use folio_content::{ContentEntity, ContentKind};

use crate::SiteGraph;

/// Sort every collection and assign prev/next ids.
///
/// Sorting is stable: entities with equal chapters or dates keep their
/// registration order.
pub fn sequence(graph: &mut SiteGraph) {
    let (pages, collections) = graph.parts_mut();

    for (category, members) in collections.iter_mut() {
        let docs = members.iter().filter(|&&i| pages[i].kind() == ContentKind::Doc).count();
        if docs == 0 || docs == members.len() {
            members.sort_by(|&a, &b| compare(&pages[a], &pages[b]));
        } else {
            members.sort_by(|&a, &b| by_date_desc(&pages[a], &pages[b]));
        }

        for (k, &idx) in members.iter().enumerate() {
            let newer = k.checked_sub(1).map(|j| pages[members[j]].id.clone());
            let older = members.get(k + 1).map(|&j| pages[j].id.clone());
            let entity = &mut pages[idx];
            entity.next = newer;
            entity.prev = older;
        }

        tracing::debug!(category = %category, items = members.len(), "Sequenced collection");
    }
}

/// Pairwise ordering of two collection members.
///
/// Two docs compare by chapter; any other pair compares by date, newest
/// first. Only a total order within a single-kind collection: mixed
/// collections sort by date throughout.
fn compare(a: &ContentEntity, b: &ContentEntity) -> Ordering {
    if a.kind() == ContentKind::Doc && b.kind() == ContentKind::Doc {
        by_chapter(a, b)
    } else {
        by_date_desc(a, b)
    }
}

fn by_chapter(a: &ContentEntity, b: &ContentEntity) -> Ordering {
    let a = a.chapter().unwrap_or_default();
    let b = b.chapter().unwrap_or_default();
    a.total_cmp(&b)
}

fn by_date_desc(a: &ContentEntity, b: &ContentEntity) -> Ordering {
    b.date.cmp(&a.date)
}
