mod customer;
mod invoice;
mod user;

pub use customer::Customer;
pub use invoice::{Invoice, InvoiceRow, InvoiceStatus, UnknownStatus};
pub use user::User;
