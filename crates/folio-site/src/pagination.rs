//! Pagination of a collection into page groups.
//!
//! A paginated entity at `blog/index.html` with 32 items and 15 per page
//! renders three outputs:
//!
//! | Page | Target | prev | next |
//! |------|--------|------|------|
//! | 1 | `blog/index.html` | none | `/blog/page/2` |
//! | 2 | `blog/page/2/index.html` | `/blog` | `/blog/page/3` |
//! | 3 | `blog/page/3/index.html` | `/blog/page/2` | none |

use serde::Serialize;

use folio_content::SiteUrl;

/// Per-slice pagination data exposed to templates as `pagination`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PaginationFrame {
    /// Items across all slices (the collection's total item count).
    pub total_posts: usize,
    /// Number of slices.
    pub total_pages: usize,
    /// 1-based number of this slice.
    pub page: usize,
    /// URL of the following slice.
    pub next: Option<String>,
    /// URL of the preceding slice.
    pub prev: Option<String>,
}

/// One rendered slice of a paginated entity.
#[derive(Debug)]
pub struct PageGroup<'a, T> {
    /// Pagination data for this slice.
    pub frame: PaginationFrame,
    /// Output path relative to the output root.
    pub target: String,
    /// Public URL of this slice.
    pub url: String,
    /// Items on this slice, in collection order.
    pub items: &'a [T],
}

/// Partition `items` into page groups of at most `per_page` items.
///
/// `target` and `url` are the paginated entity's own target path and URL;
/// the first group keeps them. An empty collection still yields one empty
/// group so the listing page is written.
#[must_use]
pub fn paginate<'a, T>(
    items: &'a [T],
    per_page: usize,
    target: &str,
    url: &str,
    site_url: &SiteUrl,
) -> Vec<PageGroup<'a, T>> {
    let per_page = per_page.max(1);
    let total_pages = items.len().div_ceil(per_page).max(1);
    let root = page_root(target);
    let page_path = |p: usize| {
        if root.is_empty() {
            format!("page/{p}")
        } else {
            format!("{root}/page/{p}")
        }
    };
    let page_url = |p: usize| site_url.resolve(&format!("/{}", page_path(p)));

    (1..=total_pages)
        .map(|page| {
            let start = (page - 1) * per_page;
            let end = (start + per_page).min(items.len());

            let prev = match page {
                1 => None,
                2 => Some(site_url.resolve(&format!("/{root}"))),
                _ => Some(page_url(page - 1)),
            };
            let next = (page < total_pages).then(|| page_url(page + 1));

            let (target, url) = if page == 1 {
                (target.to_owned(), url.to_owned())
            } else {
                (format!("{}/index.html", page_path(page)), page_url(page))
            };

            PageGroup {
                frame: PaginationFrame {
                    total_posts: items.len(),
                    total_pages,
                    page,
                    next,
                    prev,
                },
                target,
                url,
                items: &items[start.min(end)..end],
            }
        })
        .collect()
}

/// Directory of the paginated entity's target; empty at the site root.
fn page_root(target: &str) -> String {
    target
        .rsplit_once('/')
        .map_or("", |(dir, _)| dir)
        .trim_matches('/')
        .to_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn site() -> SiteUrl {
        SiteUrl::new("https://example.com", false)
    }

    #[test]
    fn test_thirty_two_items_three_pages() {
        let items: Vec<usize> = (0..32).collect();
        let groups = paginate(&items, 15, "blog/index.html", "https://example.com/blog", &site());

        assert_eq!(groups.iter().map(|g| g.items.len()).collect::<Vec<_>>(), vec![15, 15, 2]);

        let first = &groups[0];
        assert_eq!(first.target, "blog/index.html");
        assert_eq!(first.url, "https://example.com/blog");
        assert_eq!(first.frame.prev, None);
        assert_eq!(first.frame.next.as_deref(), Some("https://example.com/blog/page/2"));

        let second = &groups[1];
        assert_eq!(second.target, "blog/page/2/index.html");
        assert_eq!(second.url, "https://example.com/blog/page/2");
        assert_eq!(second.frame.prev.as_deref(), Some("https://example.com/blog"));
        assert_eq!(second.frame.next.as_deref(), Some("https://example.com/blog/page/3"));

        let third = &groups[2];
        assert_eq!(third.frame.prev.as_deref(), Some("https://example.com/blog/page/2"));
        assert_eq!(third.frame.next, None);
        assert_eq!(
            third.frame,
            PaginationFrame {
                total_posts: 32,
                total_pages: 3,
                page: 3,
                next: None,
                prev: Some("https://example.com/blog/page/2".to_owned()),
            }
        );
    }

    #[test]
    fn test_slices_reassemble_in_order() {
        let items: Vec<usize> = (0..47).collect();
        let groups = paginate(&items, 10, "index.html", "https://example.com/", &site());

        let rejoined: Vec<usize> = groups.iter().flat_map(|g| g.items.iter().copied()).collect();
        assert_eq!(rejoined, items);

        let short = groups.iter().filter(|g| g.items.len() < 10).count();
        assert_eq!(short, 1);
        assert!(groups.iter().all(|g| g.items.len() <= 10));
    }

    #[test]
    fn test_root_page_root() {
        let items: Vec<usize> = (0..3).collect();
        let groups = paginate(&items, 2, "index.html", "https://example.com/", &site());

        assert_eq!(groups[1].target, "page/2/index.html");
        assert_eq!(groups[1].url, "https://example.com/page/2");
        assert_eq!(groups[1].frame.prev.as_deref(), Some("https://example.com/"));
        assert_eq!(groups[0].frame.next.as_deref(), Some("https://example.com/page/2"));
    }

    #[test]
    fn test_exact_multiple() {
        let items: Vec<usize> = (0..30).collect();
        let groups = paginate(&items, 15, "blog/index.html", "u", &site());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].frame.next, None);
    }

    #[test]
    fn test_empty_collection_single_page() {
        let items: Vec<usize> = Vec::new();
        let groups = paginate(&items, 15, "blog/index.html", "u", &site());

        assert_eq!(groups.len(), 1);
        assert!(groups[0].items.is_empty());
        assert_eq!(groups[0].frame.total_pages, 1);
        assert_eq!(groups[0].frame.next, None);
        assert_eq!(groups[0].frame.prev, None);
    }
}
