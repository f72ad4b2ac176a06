//! In-app purchase adapters - storefront receipt verification clients.
//!
//! - `AppleReceiptValidator` - App Store verifyReceipt with sandbox fallback
//! - `GoogleReceiptValidator` - Android Publisher purchase token lookup
//! - `ProviderDispatchValidator` - routes by provider tag

mod apple;
mod dispatch;
mod google;

pub use apple::{AppleIapConfig, AppleReceiptValidator};
pub use dispatch::ProviderDispatchValidator;
pub use google::{GoogleIapConfig, GoogleReceiptValidator};
