//! Payment provider enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source of a payment.
///
/// `Apple` and `Google` payments originate from storefront webhooks and carry
/// a provider transaction id. `Manual` payments are created by operators
/// through the CRUD endpoints and have no transaction id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    Apple,
    Google,
    Manual,
}

impl PaymentProvider {
    /// Parses a provider tag as delivered on the wire.
    ///
    /// Returns None for unrecognized values; the webhook path treats that as
    /// a non-retryable rejection.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "apple" => Some(PaymentProvider::Apple),
            "google" => Some(PaymentProvider::Google),
            "manual" => Some(PaymentProvider::Manual),
            _ => None,
        }
    }

    /// Wire/storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentProvider::Apple => "apple",
            PaymentProvider::Google => "google",
            PaymentProvider::Manual => "manual",
        }
    }

    /// Whether this provider delivers receipts over the webhook endpoint.
    pub fn is_storefront(&self) -> bool {
        matches!(self, PaymentProvider::Apple | PaymentProvider::Google)
    }
}

impl fmt::Display for PaymentProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
