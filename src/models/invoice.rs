use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Payment state of an invoice. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 2] = [InvoiceStatus::Pending, InvoiceStatus::Paid];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            _ => None,
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown invoice status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for InvoiceStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_value(s).ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl TryFrom<String> for InvoiceStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A row of the `invoices` table. `amount` is in cents.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Invoice {
    pub id: String,
    pub customer_id: String,
    pub amount: i64,
    #[sqlx(try_from = "String")]
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

/// An invoice joined with its customer, as listed in the invoices table.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct InvoiceRow {
    pub id: String,
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub amount: i64,
    #[sqlx(try_from = "String")]
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_only_known_values() {
        assert_eq!("pending".parse::<InvoiceStatus>(), Ok(InvoiceStatus::Pending));
        assert_eq!("paid".parse::<InvoiceStatus>(), Ok(InvoiceStatus::Paid));
        assert_eq!(
            "Paid".parse::<InvoiceStatus>(),
            Err(UnknownStatus("Paid".to_string()))
        );
        assert!("overdue".parse::<InvoiceStatus>().is_err());
    }

    #[test]
    fn status_round_trips_through_db_text() {
        for status in InvoiceStatus::ALL {
            assert_eq!(InvoiceStatus::from_db_value(status.as_str()), Some(status));
        }
    }
}
