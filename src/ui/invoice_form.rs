//! View model for the create and edit invoice forms.

use serde::Serialize;

use crate::actions::INVOICES_PATH;
use crate::models::{Customer, Invoice, InvoiceStatus};
use crate::validation::{FieldErrors, InvoiceForm};

use super::format::cents_to_dollars;

/// What the form fields currently hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub customer_id: String,
    pub amount: String,
    pub status: String,
}

impl FormValues {
    pub fn from_invoice(invoice: &Invoice) -> Self {
        Self {
            customer_id: invoice.customer_id.clone(),
            amount: cents_to_dollars(invoice.amount),
            status: invoice.status.as_str().to_string(),
        }
    }

    /// Echo a rejected submission back so the user can correct it.
    pub fn from_form(form: &InvoiceForm) -> Self {
        Self {
            customer_id: form.customer_id.clone().unwrap_or_default(),
            amount: form.amount.clone().unwrap_or_default(),
            status: form.status.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerOption {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceFormView {
    pub title: &'static str,
    pub action: String,
    pub submit_label: &'static str,
    pub cancel_href: &'static str,
    pub selected_customer: bool,
    pub customers: Vec<CustomerOption>,
    pub amount: String,
    pub statuses: Vec<StatusOption>,
    pub customer_errors: Vec<String>,
    pub amount_errors: Vec<String>,
    pub status_errors: Vec<String>,
    pub message: Option<&'static str>,
}

impl InvoiceFormView {
    pub fn create(customers: &[Customer], values: &FormValues, errors: Option<&FieldErrors>) -> Self {
        Self::build(
            "Create Invoice",
            format!("{INVOICES_PATH}/create"),
            "Create Invoice",
            customers,
            values,
            errors,
        )
    }

    pub fn edit(
        id: &str,
        customers: &[Customer],
        values: &FormValues,
        errors: Option<&FieldErrors>,
    ) -> Self {
        Self::build(
            "Edit Invoice",
            format!("{INVOICES_PATH}/{id}/edit"),
            "Edit Invoice",
            customers,
            values,
            errors,
        )
    }

    fn build(
        title: &'static str,
        action: String,
        submit_label: &'static str,
        customers: &[Customer],
        values: &FormValues,
        errors: Option<&FieldErrors>,
    ) -> Self {
        let field_errors = |field: &str| -> Vec<String> {
            errors
                .map(|errors| errors.for_field(field).into_iter().map(String::from).collect())
                .unwrap_or_default()
        };

        Self {
            title,
            action,
            submit_label,
            cancel_href: INVOICES_PATH,
            selected_customer: customers.iter().any(|c| c.id == values.customer_id),
            customers: customers
                .iter()
                .map(|c| CustomerOption {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    selected: c.id == values.customer_id,
                })
                .collect(),
            amount: values.amount.clone(),
            statuses: InvoiceStatus::ALL
                .iter()
                .map(|status| StatusOption {
                    value: status.as_str(),
                    label: status.label(),
                    checked: status.as_str() == values.status,
                })
                .collect(),
            customer_errors: field_errors("customerId"),
            amount_errors: field_errors("amount"),
            status_errors: field_errors("status"),
            message: errors.map(|_| "Missing Fields. Failed to save invoice."),
        }
    }
}
