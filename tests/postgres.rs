//! Runs against a real Postgres. Set `TEST_DATABASE_URL` and pass
//! `--ignored` to include these.

use invoice_dashboard::actions::{create_invoice, delete_invoice, update_invoice};
use invoice_dashboard::data::{count_pages, fetch_invoice_by_id, fetch_page};
use invoice_dashboard::db::{Database, InvoiceStore};
use invoice_dashboard::invalidation::Invalidator;
use invoice_dashboard::models::InvoiceStatus;
use invoice_dashboard::validation::InvoiceForm;
use sqlx::PgPool;
use uuid::Uuid;

async fn database() -> Option<Database> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = PgPool::connect(&url).await.expect("connect");
    let db = Database::from_pool(pool);
    db.run_migrations().await.expect("migrations");
    Some(db)
}

fn form(customer_id: &str, amount: &str, status: &str) -> InvoiceForm {
    InvoiceForm {
        customer_id: Some(customer_id.to_string()),
        amount: Some(amount.to_string()),
        status: Some(status.to_string()),
    }
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL"]
async fn invoice_lifecycle_round_trips_through_postgres() {
    let Some(db) = database().await else {
        return;
    };
    let marker = Uuid::new_v4().simple().to_string();
    let customer_id: String = sqlx::query_scalar(
        "INSERT INTO customers (name, email, image_url) VALUES ($1, $2, $3) RETURNING id::text",
    )
    .bind(format!("Test {marker}"))
    .bind(format!("{marker}@example.com"))
    .bind("/customers/test.png")
    .fetch_one(db.get_pool())
    .await
    .expect("customer");

    let invalidator = Invalidator::new();
    create_invoice(&db, &invalidator, &form(&customer_id, "42.10", "pending"))
        .await
        .expect("create");

    assert_eq!(count_pages(&db, &marker).await.expect("count"), 1);
    let rows = fetch_page(&db, &marker, 1).await.expect("page");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, 4210);
    let id = rows[0].id.clone();

    update_invoice(&db, &invalidator, &id, &form(&customer_id, "1", "paid"))
        .await
        .expect("update");
    let invoice = fetch_invoice_by_id(&db, &id)
        .await
        .expect("fetch")
        .expect("exists");
    assert_eq!(invoice.amount, 100);
    assert_eq!(invoice.status, InvoiceStatus::Paid);

    let outcome = delete_invoice(&db, &invalidator, &id).await.expect("delete");
    assert_eq!(outcome.rows_affected, 1);
    assert_eq!(db.fetch_invoice(&id).await.expect("fetch"), None);
    assert_eq!(count_pages(&db, &marker).await.expect("count"), 0);

    sqlx::query("DELETE FROM customers WHERE id = $1::uuid")
        .bind(&customer_id)
        .execute(db.get_pool())
        .await
        .expect("cleanup");
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL"]
async fn malformed_ids_match_nothing() {
    let Some(db) = database().await else {
        return;
    };
    assert_eq!(db.fetch_invoice("not-a-uuid").await.expect("fetch"), None);
    assert_eq!(db.delete_invoice("not-a-uuid").await.expect("delete"), 0);
}
