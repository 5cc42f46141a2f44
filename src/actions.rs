//! Write side of the data-access layer: create, update and delete.
//!
//! Each mutation is one statement. Store failures propagate for all three
//! mutations, and the invalidation signal is only sent once a row changed.

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::db::{InvoiceChanges, InvoiceStore, NewInvoice};
use crate::error::StoreError;
use crate::invalidation::Invalidator;
use crate::validation::{FieldErrors, InvoiceForm, validate_invoice};

/// The invoices list view, target of every invalidation and redirect.
pub const INVOICES_PATH: &str = "/dashboard/invoices";

/// A mutation the store refused or could not run.
#[derive(Debug, Error)]
#[error("failed to {action} invoice: {source}")]
pub struct MutationFailed {
    pub action: &'static str,
    #[source]
    pub source: StoreError,
}

impl MutationFailed {
    fn store(action: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| {
            error!(action, error = %source, "invoice mutation failed");
            MutationFailed { action, source }
        }
    }
}

#[derive(Debug, Error)]
pub enum MutationError {
    #[error(transparent)]
    Validation(#[from] FieldErrors),

    #[error(transparent)]
    Store(#[from] MutationFailed),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    pub rows_affected: u64,
    /// Where the client goes next; `None` keeps it on the current page.
    pub redirect: Option<&'static str>,
}

pub async fn create_invoice(
    store: &dyn InvoiceStore,
    invalidator: &Invalidator,
    form: &InvoiceForm,
) -> Result<MutationOutcome, MutationError> {
    let input = validate_invoice(form)?;

    let new_invoice = NewInvoice {
        customer_id: input.customer_id,
        amount: input.amount_cents,
        status: input.status,
        date: Utc::now().date_naive(),
    };
    let id = store
        .insert_invoice(&new_invoice)
        .await
        .map_err(MutationFailed::store("create"))?;

    info!(
        invoice_id = %id,
        customer_id = %new_invoice.customer_id,
        amount = new_invoice.amount,
        status = %new_invoice.status,
        "invoice created"
    );
    invalidator.invalidate(INVOICES_PATH);

    Ok(MutationOutcome {
        rows_affected: 1,
        redirect: Some(INVOICES_PATH),
    })
}

/// An unknown `id` is a zero-row no-op: nothing is invalidated, the client
/// still returns to the list.
pub async fn update_invoice(
    store: &dyn InvoiceStore,
    invalidator: &Invalidator,
    id: &str,
    form: &InvoiceForm,
) -> Result<MutationOutcome, MutationError> {
    let input = validate_invoice(form)?;

    let changes = InvoiceChanges {
        customer_id: input.customer_id,
        amount: input.amount_cents,
        status: input.status,
    };
    let rows_affected = store
        .update_invoice(id, &changes)
        .await
        .map_err(MutationFailed::store("update"))?;

    if rows_affected == 0 {
        warn!(invoice_id = %id, "update matched no invoice");
    } else {
        info!(invoice_id = %id, amount = changes.amount, status = %changes.status, "invoice updated");
        invalidator.invalidate(INVOICES_PATH);
    }

    Ok(MutationOutcome {
        rows_affected,
        redirect: Some(INVOICES_PATH),
    })
}

/// Deletion happens in place from the list, so there is no redirect.
pub async fn delete_invoice(
    store: &dyn InvoiceStore,
    invalidator: &Invalidator,
    id: &str,
) -> Result<MutationOutcome, MutationFailed> {
    let rows_affected = store
        .delete_invoice(id)
        .await
        .map_err(MutationFailed::store("delete"))?;

    if rows_affected == 0 {
        warn!(invoice_id = %id, "delete matched no invoice");
    } else {
        info!(invoice_id = %id, "invoice deleted");
        invalidator.invalidate(INVOICES_PATH);
    }

    Ok(MutationOutcome {
        rows_affected,
        redirect: None,
    })
}
