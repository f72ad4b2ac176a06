//! Payment domain: monetary events recorded from storefront receipts.

mod entity;
mod errors;
mod provider;

pub use entity::{NewPayment, Payment, PaymentStatus};
pub use errors::PaymentError;
pub use provider::PaymentProvider;
