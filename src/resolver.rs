//! Page resolver for the invoices list.
//!
//! Builds a `QueryState` from the incoming URL on every render and asks the
//! data-access layer for the page count and then the rows.

use crate::data::{count_pages, fetch_page};
use crate::db::InvoiceStore;
use crate::error::StoreError;
use crate::models::InvoiceRow;
use crate::search::{self, PAGE_PARAM, QUERY_PARAM};

/// `query` and `page` as they appeared in the URL, first occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub query: Option<String>,
    pub page: Option<String>,
}

impl SearchParams {
    pub fn from_query_string(query_string: &str) -> Self {
        Self {
            query: search::get_param(query_string, QUERY_PARAM),
            page: search::get_param(query_string, PAGE_PARAM),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    pub query: String,
    pub page: i64,
}

impl QueryState {
    pub fn from_params(params: &SearchParams) -> Self {
        Self {
            query: params.query.clone().unwrap_or_default(),
            page: params.page.as_deref().map(parse_page).unwrap_or(1),
        }
    }

    /// Identity of the table region; changes whenever the query or page does.
    pub fn table_key(&self) -> String {
        format!("{}{}", self.query, self.page)
    }
}

/// Leading-integer parse clamped to 1: `"3abc"` is 3, `"0"`, `"-1"`, `"abc"`
/// and values that overflow are all 1.
pub fn parse_page(raw: &str) -> i64 {
    let raw = raw.trim_start();
    let (negative, digits) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    match digits[..end].parse::<i64>() {
        Ok(page) if !negative && page >= 1 => page,
        _ => 1,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    pub total_pages: i64,
    pub rows: Vec<InvoiceRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoicesPage {
    pub state: QueryState,
    pub result: PageResult,
}

/// Count first, then fetch. A page past the end yields no rows, not a redirect.
pub async fn resolve(
    store: &dyn InvoiceStore,
    state: QueryState,
) -> Result<InvoicesPage, StoreError> {
    let total_pages = count_pages(store, &state.query).await?;
    let rows = fetch_page(store, &state.query, state.page).await?;

    Ok(InvoicesPage {
        state,
        result: PageResult { total_pages, rows },
    })
}

/// Where to send a request whose `query` parameter is not in canonical form
/// (blank, or padded with whitespace), as submitted by a plain form GET.
pub fn canonical_redirect(path: &str, query_string: &str) -> Option<String> {
    let query = search::get_param(query_string, QUERY_PARAM)?;
    if !query.is_empty() && query.trim() == query {
        return None;
    }
    Some(search::href(path, &search::next_query_string(query_string, &query)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{Customer, Invoice, InvoiceStatus};
    use pretty_assertions::assert_eq;

    #[test]
    fn page_defaults_and_clamps_to_one() {
        for raw in ["0", "-1", "abc", "", "  ", "-", "99999999999999999999999"] {
            assert_eq!(parse_page(raw), 1, "page {raw:?}");
        }
        assert_eq!(parse_page("2"), 2);
        assert_eq!(parse_page(" 3"), 3);
        assert_eq!(parse_page("+4"), 4);
        assert_eq!(parse_page("3abc"), 3);
        assert_eq!(parse_page("2.7"), 2);
    }

    #[test]
    fn state_from_params_uses_defaults() {
        let state = QueryState::from_params(&SearchParams::default());
        assert_eq!(
            state,
            QueryState {
                query: String::new(),
                page: 1,
            }
        );

        let state = QueryState::from_params(&SearchParams::from_query_string("query=lee&page=0"));
        assert_eq!(state.query, "lee");
        assert_eq!(state.page, 1);
        assert_eq!(state.table_key(), "lee1");
    }

    #[test]
    fn first_occurrence_of_a_param_wins() {
        let params = SearchParams::from_query_string("page=2&page=5&query=a+b");
        assert_eq!(params.page.as_deref(), Some("2"));
        assert_eq!(params.query.as_deref(), Some("a b"));
    }

    #[test]
    fn canonical_redirect_drops_blank_query() {
        assert_eq!(
            canonical_redirect("/dashboard/invoices", "query=&page=2"),
            Some("/dashboard/invoices?page=2".to_string())
        );
        assert_eq!(
            canonical_redirect("/dashboard/invoices", "query=+lee+"),
            Some("/dashboard/invoices?query=lee".to_string())
        );
        assert_eq!(canonical_redirect("/dashboard/invoices", "query=lee"), None);
        assert_eq!(canonical_redirect("/dashboard/invoices", "page=2"), None);
    }

    #[tokio::test]
    async fn resolves_count_and_rows_for_the_requested_page() {
        let store = MemoryStore::new();
        store.add_customer(Customer {
            id: "c1".to_string(),
            name: "Amy Burns".to_string(),
            email: "amy@burns.com".to_string(),
            image_url: "/customers/amy-burns.png".to_string(),
        });
        for day in 1..=8 {
            store.add_invoice(Invoice {
                id: format!("inv-{day}"),
                customer_id: "c1".to_string(),
                amount: 100,
                status: InvoiceStatus::Paid,
                date: format!("2023-03-{day:02}").parse().expect("date"),
            });
        }

        let page = resolve(
            &store,
            QueryState {
                query: "amy".to_string(),
                page: 2,
            },
        )
        .await
        .expect("resolve");
        assert_eq!(page.result.total_pages, 2);
        assert_eq!(page.result.rows.len(), 2);

        let beyond = resolve(
            &store,
            QueryState {
                query: "amy".to_string(),
                page: 9,
            },
        )
        .await
        .expect("resolve");
        assert_eq!(beyond.result.total_pages, 2);
        assert!(beyond.result.rows.is_empty());
    }
}
