//! Ports: trait seams between the application core and the outside world.

mod payment_ledger;
mod receipt_validator;
mod subscription_store;
mod tariff_reader;
mod user_directory;

pub use payment_ledger::{LedgerOutcome, PaymentLedger};
pub use receipt_validator::{
    NormalizedReceipt, ReceiptError, ReceiptValidationRequest, ReceiptValidator,
};
pub use subscription_store::SubscriptionStore;
pub use tariff_reader::TariffReader;
pub use user_directory::UserDirectory;
