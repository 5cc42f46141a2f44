//! Display formatting for money and dates.

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Cents as US dollars with thousands separators: `123456` is `$1,234.56`.
pub fn format_currency(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, digit) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// `Dec 6, 2022`
pub fn format_date_to_local(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Stored cents back into the dollar figure an edit form starts with.
pub fn cents_to_dollars(cents: i64) -> String {
    Decimal::new(cents, 2).normalize().to_string()
}
