use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::debug;
use uuid::Uuid;

use super::{InvoiceChanges, InvoiceStore, NewInvoice, like_pattern};
use crate::config::Config;
use crate::error::StoreError;
use crate::models::{Customer, Invoice, InvoiceRow, User};

/// Database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new Database instance with a connection pool
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(config.database_url())
            .await?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the migrations bundled under `migrations/`
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(self.get_pool()).await?;
        Ok(())
    }
}

#[async_trait]
impl InvoiceStore for Database {
    async fn count_invoices(&self, query: &str) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM invoices
            JOIN customers ON invoices.customer_id = customers.id
            WHERE
                customers.name ILIKE $1 OR
                customers.email ILIKE $1 OR
                invoices.amount::text ILIKE $1 OR
                invoices.date::text ILIKE $1 OR
                invoices.status ILIKE $1
            "#,
        )
        .bind(like_pattern(query))
        .fetch_one(self.get_pool())
        .await?;

        Ok(count)
    }

    async fn fetch_invoices(
        &self,
        query: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<InvoiceRow>, StoreError> {
        let rows = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT
                invoices.id::text AS id,
                invoices.customer_id::text AS customer_id,
                customers.name,
                customers.email,
                customers.image_url,
                invoices.amount::bigint AS amount,
                invoices.status,
                invoices.date
            FROM invoices
            JOIN customers ON invoices.customer_id = customers.id
            WHERE
                customers.name ILIKE $1 OR
                customers.email ILIKE $1 OR
                invoices.amount::text ILIKE $1 OR
                invoices.date::text ILIKE $1 OR
                invoices.status ILIKE $1
            ORDER BY invoices.date DESC, invoices.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(like_pattern(query))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.get_pool())
        .await?;

        Ok(rows)
    }

    async fn fetch_invoice(&self, id: &str) -> Result<Option<Invoice>, StoreError> {
        // A malformed id cannot reference a row
        let Ok(id) = Uuid::parse_str(id) else {
            debug!(%id, "invoice id is not a uuid");
            return Ok(None);
        };

        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT
                id::text AS id,
                customer_id::text AS customer_id,
                amount::bigint AS amount,
                status,
                date
            FROM invoices
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.get_pool())
        .await?;

        Ok(invoice)
    }

    async fn fetch_customers(&self) -> Result<Vec<Customer>, StoreError> {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT id::text AS id, name, email, image_url FROM customers ORDER BY name ASC",
        )
        .fetch_all(self.get_pool())
        .await?;

        Ok(customers)
    }

    async fn insert_invoice(&self, invoice: &NewInvoice) -> Result<String, StoreError> {
        let id = sqlx::query_scalar::<_, String>(
            r#"
            INSERT INTO invoices (customer_id, amount, status, date)
            VALUES ($1::uuid, $2, $3, $4)
            RETURNING id::text
            "#,
        )
        .bind(&invoice.customer_id)
        .bind(invoice.amount)
        .bind(invoice.status.as_str())
        .bind(invoice.date)
        .fetch_one(self.get_pool())
        .await?;

        Ok(id)
    }

    async fn update_invoice(&self, id: &str, changes: &InvoiceChanges) -> Result<u64, StoreError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(0);
        };

        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET customer_id = $1::uuid, amount = $2, status = $3
            WHERE id = $4
            "#,
        )
        .bind(&changes.customer_id)
        .bind(changes.amount)
        .bind(changes.status.as_str())
        .bind(id)
        .execute(self.get_pool())
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_invoice(&self, id: &str) -> Result<u64, StoreError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(0);
        };

        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(result.rows_affected())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id::text AS id, name, email, password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.get_pool())
        .await?;

        Ok(user)
    }
}
