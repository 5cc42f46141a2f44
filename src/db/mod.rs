//! Persistence for invoices, customers and users.
//!
//! `InvoiceStore` is the seam between the data-access operations and the
//! backing store. `Database` talks to Postgres through a `PgPool`;
//! `MemoryStore` keeps everything in process and backs `DATABASE_URL=memory:`.

mod memory;
mod postgres;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::info;

use crate::config::Config;
use crate::error::StoreError;
use crate::models::{Customer, Invoice, InvoiceRow, InvoiceStatus, User};

pub use memory::MemoryStore;
pub use postgres::Database;

/// Number of invoice rows rendered per page.
pub const PAGE_SIZE: i64 = 6;

/// Values for a single-row insert into `invoices`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub customer_id: String,
    pub amount: i64,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

/// Columns rewritten by an invoice update.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceChanges {
    pub customer_id: String,
    pub amount: i64,
    pub status: InvoiceStatus,
}

/// Each method is a single statement against the store. Matching for
/// `query` is a case-insensitive substring test against customer name,
/// customer email, amount, date and status; an empty query matches all rows.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    async fn count_invoices(&self, query: &str) -> Result<i64, StoreError>;

    /// Matching rows ordered by invoice date, newest first.
    async fn fetch_invoices(
        &self,
        query: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<InvoiceRow>, StoreError>;

    async fn fetch_invoice(&self, id: &str) -> Result<Option<Invoice>, StoreError>;

    async fn fetch_customers(&self) -> Result<Vec<Customer>, StoreError>;

    /// Returns the generated invoice id.
    async fn insert_invoice(&self, invoice: &NewInvoice) -> Result<String, StoreError>;

    /// Returns the number of rows updated (0 when `id` is unknown).
    async fn update_invoice(&self, id: &str, changes: &InvoiceChanges) -> Result<u64, StoreError>;

    /// Returns the number of rows deleted (0 when `id` is unknown).
    async fn delete_invoice(&self, id: &str) -> Result<u64, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}

/// Escape `LIKE` metacharacters so the search term matches literally.
pub(crate) fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Open the store selected by `DATABASE_URL`.
pub async fn init(config: &Config) -> Result<Arc<dyn InvoiceStore>> {
    if config.uses_memory_store() {
        info!("using in-memory store with placeholder data");
        let store = MemoryStore::seeded()?;
        return Ok(Arc::new(store));
    }

    let db = Database::new(config).await?;

    if config.run_migrations {
        db.run_migrations().await?;
        info!("database migrations applied");
    }

    Ok(Arc::new(db))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_wraps_and_escapes() {
        assert_eq!(like_pattern(""), "%%");
        assert_eq!(like_pattern("lee"), "%lee%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }
}
