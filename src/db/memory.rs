use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use super::{InvoiceChanges, InvoiceStore, NewInvoice};
use crate::error::StoreError;
use crate::models::{Customer, Invoice, InvoiceRow, InvoiceStatus, User};

/// In-process store with the same query semantics as the Postgres backend.
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    available: AtomicBool,
}

#[derive(Default)]
struct MemoryState {
    customers: Vec<Customer>,
    invoices: Vec<Invoice>,
    users: Vec<User>,
}

const PLACEHOLDER_CUSTOMERS: [(&str, &str, &str); 6] = [
    ("Evil Rabbit", "evil@rabbit.com", "/customers/evil-rabbit.png"),
    ("Delba de Oliveira", "delba@oliveira.com", "/customers/delba-de-oliveira.png"),
    ("Lee Robinson", "lee@robinson.com", "/customers/lee-robinson.png"),
    ("Michael Novotny", "michael@novotny.com", "/customers/michael-novotny.png"),
    ("Amy Burns", "amy@burns.com", "/customers/amy-burns.png"),
    ("Balazs Orban", "balazs@orban.com", "/customers/balazs-orban.png"),
];

// (customer index, cents, status, date)
const PLACEHOLDER_INVOICES: [(usize, i64, InvoiceStatus, (i32, u32, u32)); 13] = [
    (0, 15795, InvoiceStatus::Pending, (2022, 12, 6)),
    (1, 20348, InvoiceStatus::Pending, (2022, 11, 14)),
    (4, 3040, InvoiceStatus::Paid, (2022, 10, 29)),
    (3, 44800, InvoiceStatus::Paid, (2023, 9, 10)),
    (5, 34577, InvoiceStatus::Pending, (2023, 8, 5)),
    (2, 54246, InvoiceStatus::Pending, (2023, 7, 16)),
    (0, 666, InvoiceStatus::Pending, (2023, 6, 27)),
    (3, 32545, InvoiceStatus::Paid, (2023, 6, 9)),
    (4, 1250, InvoiceStatus::Paid, (2023, 6, 17)),
    (5, 8546, InvoiceStatus::Paid, (2023, 6, 7)),
    (1, 500, InvoiceStatus::Paid, (2023, 8, 19)),
    (5, 8945, InvoiceStatus::Paid, (2023, 6, 3)),
    (4, 1000, InvoiceStatus::Paid, (2022, 6, 5)),
];

const PLACEHOLDER_USER: (&str, &str, &str) = ("User", "user@nextmail.com", "123456");

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            available: AtomicBool::new(true),
        }
    }

    /// A store pre-populated with demo customers, invoices and one login
    /// (`user@nextmail.com` / `123456`).
    pub fn seeded() -> Result<Self, bcrypt::BcryptError> {
        Self::seeded_with_cost(bcrypt::DEFAULT_COST)
    }

    pub fn seeded_with_cost(cost: u32) -> Result<Self, bcrypt::BcryptError> {
        let store = Self::new();

        let customers: Vec<Customer> = PLACEHOLDER_CUSTOMERS
            .iter()
            .map(|(name, email, image_url)| Customer {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                email: email.to_string(),
                image_url: image_url.to_string(),
            })
            .collect();

        for (customer, amount, status, (y, m, d)) in PLACEHOLDER_INVOICES {
            let Some(date) = NaiveDate::from_ymd_opt(y, m, d) else {
                continue;
            };
            store.add_invoice(Invoice {
                id: Uuid::new_v4().to_string(),
                customer_id: customers[customer].id.clone(),
                amount,
                status,
                date,
            });
        }
        for customer in customers {
            store.add_customer(customer);
        }

        let (name, email, password) = PLACEHOLDER_USER;
        store.add_user(User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password: bcrypt::hash(password, cost)?,
        });

        Ok(store)
    }

    pub fn add_customer(&self, customer: Customer) {
        if let Ok(mut state) = self.state.write() {
            state.customers.push(customer);
        }
    }

    pub fn add_invoice(&self, invoice: Invoice) {
        if let Ok(mut state) = self.state.write() {
            state.invoices.push(invoice);
        }
    }

    pub fn add_user(&self, user: User) {
        if let Ok(mut state) = self.state.write() {
            state.users.push(user);
        }
    }

    /// Snapshot of every stored invoice in insertion order.
    pub fn invoices(&self) -> Vec<Invoice> {
        self.state
            .read()
            .map(|state| state.invoices.clone())
            .unwrap_or_default()
    }

    /// Simulate the store going away; every operation fails while unavailable.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>, StoreError> {
        self.ensure_available()?;
        self.state
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>, StoreError> {
        self.ensure_available()?;
        self.state
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryState {
    /// Inner join of invoices with customers, filtered and sorted newest first.
    fn matching_rows(&self, query: &str) -> Vec<InvoiceRow> {
        let needle = query.to_lowercase();
        let mut rows: Vec<InvoiceRow> = self
            .invoices
            .iter()
            .filter_map(|invoice| {
                let customer = self.customers.iter().find(|c| c.id == invoice.customer_id)?;
                Some(InvoiceRow {
                    id: invoice.id.clone(),
                    customer_id: customer.id.clone(),
                    name: customer.name.clone(),
                    email: customer.email.clone(),
                    image_url: customer.image_url.clone(),
                    amount: invoice.amount,
                    status: invoice.status,
                    date: invoice.date,
                })
            })
            .filter(|row| row_matches(row, &needle))
            .collect();

        // same total order as the Postgres query: date, then id, both descending
        rows.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        rows
    }

    fn has_customer(&self, id: &str) -> bool {
        self.customers.iter().any(|c| c.id == id)
    }
}

fn row_matches(row: &InvoiceRow, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    [
        row.name.to_lowercase(),
        row.email.to_lowercase(),
        row.amount.to_string(),
        row.date.format("%Y-%m-%d").to_string(),
        row.status.as_str().to_string(),
    ]
    .iter()
    .any(|field| field.contains(needle))
}

#[async_trait]
impl InvoiceStore for MemoryStore {
    async fn count_invoices(&self, query: &str) -> Result<i64, StoreError> {
        let state = self.read()?;
        Ok(state.matching_rows(query).len() as i64)
    }

    async fn fetch_invoices(
        &self,
        query: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<InvoiceRow>, StoreError> {
        let state = self.read()?;
        let offset = usize::try_from(offset).unwrap_or(0);
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(state
            .matching_rows(query)
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    async fn fetch_invoice(&self, id: &str) -> Result<Option<Invoice>, StoreError> {
        let state = self.read()?;
        Ok(state.invoices.iter().find(|i| i.id == id).cloned())
    }

    async fn fetch_customers(&self) -> Result<Vec<Customer>, StoreError> {
        let state = self.read()?;
        let mut customers = state.customers.clone();
        customers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(customers)
    }

    async fn insert_invoice(&self, invoice: &NewInvoice) -> Result<String, StoreError> {
        let mut state = self.write()?;
        if !state.has_customer(&invoice.customer_id) {
            return Err(StoreError::Rejected(format!(
                "customer '{}' does not exist",
                invoice.customer_id
            )));
        }

        let id = Uuid::new_v4().to_string();
        state.invoices.push(Invoice {
            id: id.clone(),
            customer_id: invoice.customer_id.clone(),
            amount: invoice.amount,
            status: invoice.status,
            date: invoice.date,
        });
        Ok(id)
    }

    async fn update_invoice(&self, id: &str, changes: &InvoiceChanges) -> Result<u64, StoreError> {
        let mut state = self.write()?;
        // an unknown id matches no row before the foreign key is ever checked
        if !state.invoices.iter().any(|i| i.id == id) {
            return Ok(0);
        }
        if !state.has_customer(&changes.customer_id) {
            return Err(StoreError::Rejected(format!(
                "customer '{}' does not exist",
                changes.customer_id
            )));
        }

        let Some(invoice) = state.invoices.iter_mut().find(|i| i.id == id) else {
            return Ok(0);
        };
        invoice.customer_id = changes.customer_id.clone();
        invoice.amount = changes.amount;
        invoice.status = changes.status;
        Ok(1)
    }

    async fn delete_invoice(&self, id: &str) -> Result<u64, StoreError> {
        let mut state = self.write()?;
        let before = state.invoices.len();
        state.invoices.retain(|i| i.id != id);
        Ok((before - state.invoices.len()) as u64)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let state = self.read()?;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn customer(id: &str, name: &str, email: &str) -> Customer {
        Customer {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            image_url: format!("/customers/{id}.png"),
        }
    }

    fn invoice(id: &str, customer_id: &str, amount: i64, status: InvoiceStatus, date: &str) -> Invoice {
        Invoice {
            id: id.to_string(),
            customer_id: customer_id.to_string(),
            amount,
            status,
            date: date.parse().expect("date"),
        }
    }

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store.add_customer(customer("c-lee", "Lee Robinson", "lee@robinson.com"));
        store.add_customer(customer("c-amy", "Amy Burns", "amy@burns.com"));
        store.add_invoice(invoice("i1", "c-lee", 54246, InvoiceStatus::Pending, "2023-07-16"));
        store.add_invoice(invoice("i2", "c-amy", 1250, InvoiceStatus::Paid, "2023-06-17"));
        store.add_invoice(invoice("i3", "c-amy", 3040, InvoiceStatus::Paid, "2022-10-29"));
        store
    }

    #[tokio::test]
    async fn search_is_case_insensitive_across_columns() {
        let store = store();

        assert_eq!(store.count_invoices("").await.expect("count"), 3);
        assert_eq!(store.count_invoices("LEE").await.expect("count"), 1);
        assert_eq!(store.count_invoices("burns.com").await.expect("count"), 2);
        assert_eq!(store.count_invoices("5424").await.expect("count"), 1);
        assert_eq!(store.count_invoices("2023-06").await.expect("count"), 1);
        assert_eq!(store.count_invoices("Paid").await.expect("count"), 2);
        assert_eq!(store.count_invoices("nobody").await.expect("count"), 0);
    }

    #[tokio::test]
    async fn fetch_orders_by_date_descending_and_pages() {
        let store = store();

        let ids: Vec<String> = store
            .fetch_invoices("", 2, 0)
            .await
            .expect("fetch")
            .into_iter()
            .map(|row| row.id)
            .collect();
        assert_eq!(ids, vec!["i1".to_string(), "i2".to_string()]);

        let rest = store.fetch_invoices("", 2, 2).await.expect("fetch");
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].id, "i3");
        assert_eq!(rest[0].name, "Amy Burns");

        assert!(store.fetch_invoices("", 2, 10).await.expect("fetch").is_empty());
    }

    #[tokio::test]
    async fn same_day_invoices_split_cleanly_across_pages() {
        let store = MemoryStore::new();
        store.add_customer(customer("c-lee", "Lee Robinson", "lee@robinson.com"));
        for id in ["d", "a", "g", "c", "f", "b", "e"] {
            store.add_invoice(invoice(id, "c-lee", 100, InvoiceStatus::Pending, "2024-03-01"));
        }

        let ids = |rows: Vec<InvoiceRow>| rows.into_iter().map(|row| row.id).collect::<Vec<_>>();
        let first = ids(store.fetch_invoices("", 6, 0).await.expect("page 1"));
        let second = ids(store.fetch_invoices("", 6, 6).await.expect("page 2"));

        assert_eq!(first, vec!["g", "f", "e", "d", "c", "b"]);
        assert_eq!(second, vec!["a"]);
    }

    #[tokio::test]
    async fn invoices_without_a_customer_are_not_listed() {
        let store = store();
        store.add_invoice(invoice("orphan", "c-gone", 10, InvoiceStatus::Paid, "2024-01-01"));

        assert_eq!(store.count_invoices("").await.expect("count"), 3);
    }

    #[tokio::test]
    async fn insert_requires_an_existing_customer() {
        let store = store();
        let new = NewInvoice {
            customer_id: "c-missing".to_string(),
            amount: 100,
            status: InvoiceStatus::Pending,
            date: "2024-01-01".parse().expect("date"),
        };

        let err = store.insert_invoice(&new).await.expect_err("fk");
        assert!(matches!(err, StoreError::Rejected(_)));
    }

    #[tokio::test]
    async fn update_and_delete_report_rows_affected() {
        let store = store();
        let changes = InvoiceChanges {
            customer_id: "c-lee".to_string(),
            amount: 99,
            status: InvoiceStatus::Paid,
        };

        assert_eq!(store.update_invoice("i2", &changes).await.expect("update"), 1);
        assert_eq!(store.update_invoice("nope", &changes).await.expect("update"), 0);
        assert_eq!(store.delete_invoice("i3").await.expect("delete"), 1);
        assert_eq!(store.delete_invoice("i3").await.expect("delete"), 0);

        let updated = store.fetch_invoice("i2").await.expect("fetch").expect("row");
        assert_eq!(updated.amount, 99);
        assert_eq!(updated.customer_id, "c-lee");
    }

    #[tokio::test]
    async fn unknown_id_is_a_no_op_even_with_an_unknown_customer() {
        let store = store();
        let changes = InvoiceChanges {
            customer_id: "c-missing".to_string(),
            amount: 1,
            status: InvoiceStatus::Paid,
        };

        assert_eq!(store.update_invoice("nope", &changes).await.expect("no-op"), 0);
        let err = store.update_invoice("i1", &changes).await.expect_err("fk");
        assert!(matches!(err, StoreError::Rejected(_)));
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = store();
        store.set_available(false);

        assert!(matches!(
            store.count_invoices("").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.fetch_customers().await.is_err());

        store.set_available(true);
        assert!(store.fetch_customers().await.is_ok());
    }

    #[test]
    fn seeded_store_has_placeholder_data() {
        let store = MemoryStore::seeded_with_cost(4).expect("seed");
        assert_eq!(store.invoices().len(), PLACEHOLDER_INVOICES.len());

        let state = store.state.read().expect("lock");
        assert_eq!(state.customers.len(), PLACEHOLDER_CUSTOMERS.len());
        let user = &state.users[0];
        assert!(bcrypt::verify("123456", &user.password).expect("verify"));
    }
}
