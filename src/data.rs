//! Read side of the data-access layer.

use tracing::debug;

use crate::db::{InvoiceStore, PAGE_SIZE};
use crate::error::StoreError;
use crate::models::{Customer, Invoice, InvoiceRow};

/// `ceil(count / PAGE_SIZE)`; zero rows means zero pages.
pub fn total_pages(count: i64) -> i64 {
    let count = count.max(0);
    (count + PAGE_SIZE - 1) / PAGE_SIZE
}

/// Row offset of a 1-based page.
pub fn page_offset(page: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(PAGE_SIZE)
}

pub async fn count_pages(store: &dyn InvoiceStore, query: &str) -> Result<i64, StoreError> {
    let count = store.count_invoices(query).await?;
    let pages = total_pages(count);
    debug!(query, count, pages, "counted matching invoices");
    Ok(pages)
}

/// Up to `PAGE_SIZE` matching rows for `page`; empty past the last page.
pub async fn fetch_page(
    store: &dyn InvoiceStore,
    query: &str,
    page: i64,
) -> Result<Vec<InvoiceRow>, StoreError> {
    store
        .fetch_invoices(query, PAGE_SIZE, page_offset(page))
        .await
}

pub async fn fetch_invoice_by_id(
    store: &dyn InvoiceStore,
    id: &str,
) -> Result<Option<Invoice>, StoreError> {
    store.fetch_invoice(id).await
}

pub async fn fetch_customers(store: &dyn InvoiceStore) -> Result<Vec<Customer>, StoreError> {
    store.fetch_customers().await
}
