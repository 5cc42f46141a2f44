//! Page-number strip under the invoices table.

use serde::Serialize;

use crate::search::page_url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSlot {
    Number(i64),
    Ellipsis,
}

/// Up to seven pages are listed in full. Beyond that the first and last
/// pages stay visible and the gap around the current page collapses.
pub fn generate_pagination(current: i64, total: i64) -> Vec<PageSlot> {
    use PageSlot::{Ellipsis, Number};

    if total <= 7 {
        return (1..=total).map(Number).collect();
    }
    if current <= 3 {
        return vec![Number(1), Number(2), Number(3), Ellipsis, Number(total - 1), Number(total)];
    }
    if current >= total - 2 {
        return vec![
            Number(1),
            Number(2),
            Ellipsis,
            Number(total - 2),
            Number(total - 1),
            Number(total),
        ];
    }
    vec![
        Number(1),
        Ellipsis,
        Number(current - 1),
        Number(current),
        Number(current + 1),
        Ellipsis,
        Number(total),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub label: String,
    /// `None` for the current page and for ellipses.
    pub href: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationView {
    pub previous: Option<String>,
    pub next: Option<String>,
    pub pages: Vec<PageLink>,
}

pub fn pagination_view(path: &str, query_string: &str, current: i64, total: i64) -> PaginationView {
    let pages = generate_pagination(current, total)
        .into_iter()
        .map(|slot| match slot {
            PageSlot::Number(page) if page == current => PageLink {
                label: page.to_string(),
                href: None,
                active: true,
            },
            PageSlot::Number(page) => PageLink {
                label: page.to_string(),
                href: Some(page_url(path, query_string, page)),
                active: false,
            },
            PageSlot::Ellipsis => PageLink {
                label: "...".to_string(),
                href: None,
                active: false,
            },
        })
        .collect();

    PaginationView {
        previous: (current > 1).then(|| page_url(path, query_string, current - 1)),
        next: (current < total).then(|| page_url(path, query_string, current + 1)),
        pages,
    }
}

#[cfg(test)]
mod tests {
    use super::PageSlot::{Ellipsis, Number};
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn short_ranges_list_every_page() {
        assert_eq!(generate_pagination(1, 0), vec![]);
        assert_eq!(generate_pagination(2, 3), vec![Number(1), Number(2), Number(3)]);
        assert_eq!(generate_pagination(7, 7).len(), 7);
    }

    #[test]
    fn long_ranges_collapse_around_current() {
        assert_eq!(
            generate_pagination(2, 10),
            vec![Number(1), Number(2), Number(3), Ellipsis, Number(9), Number(10)]
        );
        assert_eq!(
            generate_pagination(9, 10),
            vec![Number(1), Number(2), Ellipsis, Number(8), Number(9), Number(10)]
        );
        assert_eq!(
            generate_pagination(5, 10),
            vec![
                Number(1),
                Ellipsis,
                Number(4),
                Number(5),
                Number(6),
                Ellipsis,
                Number(10)
            ]
        );
    }

    #[test]
    fn links_keep_the_search_term() {
        let view = pagination_view("/dashboard/invoices", "query=lee&page=2", 2, 3);

        assert_eq!(
            view.previous.as_deref(),
            Some("/dashboard/invoices?query=lee&page=1")
        );
        assert_eq!(
            view.next.as_deref(),
            Some("/dashboard/invoices?query=lee&page=3")
        );
        assert_eq!(view.pages[1].href, None);
        assert!(view.pages[1].active);
        assert_eq!(
            view.pages[2].href.as_deref(),
            Some("/dashboard/invoices?query=lee&page=3")
        );
    }

    #[test]
    fn arrows_disable_at_the_edges() {
        let view = pagination_view("/dashboard/invoices", "", 1, 1);
        assert_eq!(view.previous, None);
        assert_eq!(view.next, None);

        let past_end = pagination_view("/dashboard/invoices", "page=5", 5, 2);
        assert_eq!(past_end.next, None);
        assert!(past_end.previous.is_some());
    }
}
