//! Receipt validator port for storefront verification services.
//!
//! One method, one result-or-failure type. Apple and Google are swappable
//! implementations behind this trait; a dispatching implementation routes on
//! the provider tag.
//!
//! Implementations must not mutate any local state; the only side effect is
//! the outbound verification call, bounded by a configured timeout.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;
use crate::domain::payment::PaymentProvider;

/// Port for validating an opaque storefront receipt.
#[async_trait]
pub trait ReceiptValidator: Send + Sync {
    /// Verifies a receipt with the storefront and normalizes the result.
    async fn validate(
        &self,
        request: ReceiptValidationRequest,
    ) -> Result<NormalizedReceipt, ReceiptError>;
}

/// What the reconciler hands to a validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptValidationRequest {
    /// Which storefront issued the receipt.
    pub provider: PaymentProvider,

    /// Opaque receipt blob (Apple base64 receipt or Google purchase token).
    pub receipt: String,

    /// App identifier (Apple bundle id / Google package name).
    pub app_id: String,

    /// Product id; required for Google, ignored for Apple (derived from the
    /// receipt itself).
    pub product_id: Option<String>,
}

/// A verified receipt, normalized across providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedReceipt {
    /// Storefront-assigned transaction id, globally unique per provider.
    pub transaction_id: String,

    /// Storefront product identifier.
    pub product_id: String,

    /// When the purchase happened, per the storefront.
    pub purchase_date: Option<Timestamp>,

    /// Storefront-reported expiry. Carried for observability; grant length
    /// is recomputed from the catalog duration.
    pub expiry_date: Option<Timestamp>,
}

/// Failure classes for receipt validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptError {
    /// The receipt blob could not be parsed or was structurally invalid.
    /// Non-retryable.
    Malformed(String),

    /// The storefront examined the receipt and rejected it (invalid,
    /// fraudulent, refunded). Non-retryable.
    Rejected(String),

    /// The verification service could not be reached or answered with a
    /// transient failure. Retryable.
    Unavailable(String),
}

impl ReceiptError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        ReceiptError::Malformed(reason.into())
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        ReceiptError::Rejected(reason.into())
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        ReceiptError::Unavailable(reason.into())
    }

    /// Whether the webhook caller should redeliver.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ReceiptError::Unavailable(_))
    }
}

impl std::fmt::Display for ReceiptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReceiptError::Malformed(reason) => write!(f, "malformed receipt: {}", reason),
            ReceiptError::Rejected(reason) => write!(f, "receipt rejected: {}", reason),
            ReceiptError::Unavailable(reason) => {
                write!(f, "verification unavailable: {}", reason)
            }
        }
    }
}

impl std::error::Error for ReceiptError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_validator_is_object_safe() {
        fn _accepts_dyn(_validator: &dyn ReceiptValidator) {}
    }

    #[test]
    fn only_unavailable_is_retryable() {
        assert!(ReceiptError::unavailable("timeout").is_retryable());
        assert!(!ReceiptError::malformed("not base64").is_retryable());
        assert!(!ReceiptError::rejected("status 21003").is_retryable());
    }

    #[test]
    fn display_names_the_failure_class() {
        assert!(ReceiptError::malformed("x").to_string().contains("malformed"));
        assert!(ReceiptError::rejected("x").to_string().contains("rejected"));
        assert!(ReceiptError::unavailable("x")
            .to_string()
            .contains("unavailable"));
    }
}
