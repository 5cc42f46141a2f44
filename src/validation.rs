//! Form validation for invoice mutations and login.
//!
//! Every validator collects all field errors rather than stopping at the
//! first one, so forms can annotate each bad field.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::InvoiceStatus;

pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Messages attached to `field`, in the order they were raised.
    pub fn for_field(&self, field: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid fields: ")?;
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} ({})", error.field, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Raw invoice form submission. Fields are opaque strings until validated.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InvoiceForm {
    #[serde(rename = "customerId", default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A validated invoice submission with the amount already in cents.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceInput {
    pub customer_id: String,
    pub amount_cents: i64,
    pub status: InvoiceStatus,
}

pub fn validate_invoice(form: &InvoiceForm) -> Result<InvoiceInput, FieldErrors> {
    let mut errors = FieldErrors::default();

    let customer_id = form.customer_id.as_deref().unwrap_or_default().trim();
    if customer_id.is_empty() {
        errors.push("customerId", "Please select a customer.");
    }

    let amount_cents = match parse_amount(form.amount.as_deref().unwrap_or_default()) {
        Ok(cents) => Some(cents),
        Err(message) => {
            errors.push("amount", message);
            None
        }
    };

    let status = form
        .status
        .as_deref()
        .and_then(|s| InvoiceStatus::from_db_value(s.trim()));
    if status.is_none() {
        errors.push("status", "Please select an invoice status.");
    }

    match (amount_cents, status) {
        (Some(amount_cents), Some(status)) => errors.into_result(|| InvoiceInput {
            customer_id: customer_id.to_string(),
            amount_cents,
            status,
        }),
        _ => Err(errors),
    }
}

/// Parse a dollar amount into cents, rounding half away from zero.
pub fn parse_amount(raw: &str) -> Result<i64, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("Please enter an amount.");
    }

    let amount = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| "Please enter a numeric amount.")?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err("Please enter an amount greater than or equal to $0.");
    }

    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|cents| cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|cents| cents.to_i64())
        .ok_or("Amount is too large.")
}

/// Raw login form submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(rename = "callbackUrl", default)]
    pub callback_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub fn validate_credentials(form: &LoginForm) -> Result<Credentials, FieldErrors> {
    let mut errors = FieldErrors::default();

    let email = form.email.trim();
    if !EMAIL_RE.is_match(email) {
        errors.push("email", "Invalid email address.");
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(
            "password",
            format!("Password must contain at least {MIN_PASSWORD_LEN} characters."),
        );
    }

    errors.into_result(|| Credentials {
        email: email.to_string(),
        password: form.password.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn form(customer_id: &str, amount: &str, status: &str) -> InvoiceForm {
        InvoiceForm {
            customer_id: Some(customer_id.to_string()),
            amount: Some(amount.to_string()),
            status: Some(status.to_string()),
        }
    }

    #[test]
    fn accepts_a_valid_invoice_and_converts_to_cents() {
        let input = validate_invoice(&form("c1", "10.00", "pending")).expect("valid");
        assert_eq!(
            input,
            InvoiceInput {
                customer_id: "c1".to_string(),
                amount_cents: 1000,
                status: InvoiceStatus::Pending,
            }
        );
    }

    #[test]
    fn amount_conversion_avoids_float_drift() {
        assert_eq!(parse_amount("0.29"), Ok(29));
        assert_eq!(parse_amount("19.99"), Ok(1999));
        assert_eq!(parse_amount("0.005"), Ok(1));
        assert_eq!(parse_amount(" 7 "), Ok(700));
        assert_eq!(parse_amount("1e2"), Ok(10000));
        assert_eq!(parse_amount("0"), Ok(0));
        assert_eq!(parse_amount("-0"), Ok(0));
    }

    #[test]
    fn rejects_bad_amounts() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount("ten").is_err());
        assert!(parse_amount("-1").is_err());
        assert!(parse_amount("99999999999999999999999999").is_err());
    }

    #[test]
    fn collects_every_field_error() {
        let errors = validate_invoice(&InvoiceForm::default()).expect_err("invalid");
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["customerId", "amount", "status"]);
        assert_eq!(errors.for_field("status"), vec!["Please select an invoice status."]);
    }

    #[test]
    fn rejects_unknown_status() {
        let errors = validate_invoice(&form("c1", "5", "overdue")).expect_err("invalid");
        assert_eq!(errors.for_field("status").len(), 1);
        assert!(errors.for_field("amount").is_empty());
    }

    #[test]
    fn login_requires_email_and_long_enough_password() {
        let ok = validate_credentials(&LoginForm {
            email: " user@nextmail.com ".to_string(),
            password: "123456".to_string(),
            callback_url: None,
        })
        .expect("valid");
        assert_eq!(ok.email, "user@nextmail.com");

        let errors = validate_credentials(&LoginForm {
            email: "not-an-email".to_string(),
            password: "12345".to_string(),
            callback_url: None,
        })
        .expect_err("invalid");
        assert_eq!(errors.for_field("email").len(), 1);
        assert_eq!(errors.for_field("password").len(), 1);
    }
}
