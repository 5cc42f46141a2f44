//! View model for the invoices list page.

use serde::Serialize;

use crate::models::InvoiceRow;
use crate::resolver::InvoicesPage;
use crate::search::{QUERY_PARAM, SEARCH_DEBOUNCE};

use super::format::{format_currency, format_date_to_local};
use super::pagination::{PaginationView, pagination_view};

/// Where open list pages listen for invalidations.
pub const EVENTS_PATH: &str = "/dashboard/invoices/events";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceRowView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub amount: String,
    pub date: String,
    pub status: &'static str,
    pub status_label: &'static str,
}

impl From<&InvoiceRow> for InvoiceRowView {
    fn from(row: &InvoiceRow) -> Self {
        Self {
            id: row.id.clone(),
            name: row.name.clone(),
            email: row.email.clone(),
            image_url: row.image_url.clone(),
            amount: format_currency(row.amount),
            date: format_date_to_local(row.date),
            status: row.status.as_str(),
            status_label: row.status.label(),
        }
    }
}

/// A parameter the search box does not own, resubmitted untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HiddenParam {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoicesView {
    pub path: String,
    pub query: String,
    pub table_key: String,
    pub rows: Vec<InvoiceRowView>,
    pub hidden_params: Vec<HiddenParam>,
    pub pagination: PaginationView,
    pub debounce_ms: u64,
    pub events_path: &'static str,
}

impl InvoicesView {
    pub fn new(path: &str, query_string: &str, page: &InvoicesPage) -> Self {
        let hidden_params = url::form_urlencoded::parse(query_string.as_bytes())
            .filter(|(name, _)| name != QUERY_PARAM)
            .map(|(name, value)| HiddenParam {
                name: name.into_owned(),
                value: value.into_owned(),
            })
            .collect();

        Self {
            path: path.to_string(),
            query: page.state.query.clone(),
            table_key: page.state.table_key(),
            rows: page.result.rows.iter().map(InvoiceRowView::from).collect(),
            hidden_params,
            pagination: pagination_view(
                path,
                query_string,
                page.state.page,
                page.result.total_pages,
            ),
            debounce_ms: u64::try_from(SEARCH_DEBOUNCE.as_millis()).unwrap_or(u64::MAX),
            events_path: EVENTS_PATH,
        }
    }
}
