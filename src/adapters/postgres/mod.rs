//! PostgreSQL adapters - database implementations of the storage ports.
//!
//! - `PostgresPaymentLedger` - idempotent payment and grant persistence
//! - `PostgresSubscriptionStore` - grant reads and the expiry sweep
//! - `PostgresTariffReader` - read-only tariff lookups
//! - `PostgresUserDirectory` - user existence checks

mod payment_ledger;
mod subscription_store;
mod tariff_reader;
mod user_directory;

pub use payment_ledger::PostgresPaymentLedger;
pub use subscription_store::PostgresSubscriptionStore;
pub use tariff_reader::PostgresTariffReader;
pub use user_directory::PostgresUserDirectory;
