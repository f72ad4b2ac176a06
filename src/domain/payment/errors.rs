//! Payment-specific error types.
//!
//! The reconciliation taxonomy: input validation and not-found errors end the
//! webhook state machine with no side effects; storefront and storage errors
//! are retryable and redelivery is safe once it reaches the ledger step.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | MissingField | 400 |
//! | UnknownProvider | 400 |
//! | UnknownProduct | 400 |
//! | InvalidReceipt | 400 |
//! | UserNotFound | 404 |
//! | TariffNotFound | 404 |
//! | PaymentNotFound | 404 |
//! | Forbidden | 403 |
//! | StorefrontUnavailable | 502 |
//! | Storage | 503 |

use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, TariffId, UserId};

/// Errors raised while reconciling or serving payments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// A required webhook field was absent.
    MissingField(&'static str),

    /// The provider tag was not a recognized value.
    UnknownProvider(String),

    /// The receipt's product id is absent from the catalog.
    UnknownProduct(String),

    /// The receipt was malformed or rejected by the storefront.
    InvalidReceipt { reason: String },

    /// No user with this id.
    UserNotFound(UserId),

    /// The mapped tariff does not exist in the catalog storage.
    TariffNotFound(TariffId),

    /// No payment with this id.
    PaymentNotFound(PaymentId),

    /// Caller is not allowed to touch this payment.
    Forbidden,

    /// The storefront verification service could not be reached; the caller
    /// should redeliver.
    StorefrontUnavailable { reason: String },

    /// Storage failure; the caller should redeliver.
    Storage(String),
}

impl PaymentError {
    pub fn missing_field(field: &'static str) -> Self {
        PaymentError::MissingField(field)
    }

    pub fn unknown_provider(provider: impl Into<String>) -> Self {
        PaymentError::UnknownProvider(provider.into())
    }

    pub fn unknown_product(product_id: impl Into<String>) -> Self {
        PaymentError::UnknownProduct(product_id.into())
    }

    pub fn invalid_receipt(reason: impl Into<String>) -> Self {
        PaymentError::InvalidReceipt {
            reason: reason.into(),
        }
    }

    pub fn user_not_found(user_id: UserId) -> Self {
        PaymentError::UserNotFound(user_id)
    }

    pub fn tariff_not_found(tariff_id: TariffId) -> Self {
        PaymentError::TariffNotFound(tariff_id)
    }

    pub fn payment_not_found(payment_id: PaymentId) -> Self {
        PaymentError::PaymentNotFound(payment_id)
    }

    pub fn storefront_unavailable(reason: impl Into<String>) -> Self {
        PaymentError::StorefrontUnavailable {
            reason: reason.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        PaymentError::Storage(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            PaymentError::MissingField(_) => ErrorCode::ValidationFailed,
            PaymentError::UnknownProvider(_) => ErrorCode::UnknownProvider,
            PaymentError::UnknownProduct(_) => ErrorCode::UnknownProduct,
            PaymentError::InvalidReceipt { .. } => ErrorCode::InvalidReceipt,
            PaymentError::UserNotFound(_) => ErrorCode::UserNotFound,
            PaymentError::TariffNotFound(_) => ErrorCode::TariffNotFound,
            PaymentError::PaymentNotFound(_) => ErrorCode::PaymentNotFound,
            PaymentError::Forbidden => ErrorCode::Forbidden,
            PaymentError::StorefrontUnavailable { .. } => ErrorCode::StorefrontUnavailable,
            PaymentError::Storage(_) => ErrorCode::DatabaseError,
        }
    }

    /// Whether the webhook caller may redeliver the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::StorefrontUnavailable { .. } | PaymentError::Storage(_)
        )
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            PaymentError::MissingField(field) => format!("{} is required", field),
            PaymentError::UnknownProvider(provider) => {
                format!("Unknown provider: {}", provider)
            }
            PaymentError::UnknownProduct(product_id) => {
                format!("Unknown product: {}", product_id)
            }
            PaymentError::InvalidReceipt { reason } => format!("Invalid receipt: {}", reason),
            PaymentError::UserNotFound(_) => "User not found".to_string(),
            PaymentError::TariffNotFound(id) => format!("Tariff {} not found", id),
            PaymentError::PaymentNotFound(_) => "Payment not found".to_string(),
            PaymentError::Forbidden => "Not allowed".to_string(),
            PaymentError::StorefrontUnavailable { reason } => {
                format!("Receipt verification unavailable: {}", reason)
            }
            PaymentError::Storage(message) => format!("Storage error: {}", message),
        }
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}

impl std::error::Error for PaymentError {}

impl From<DomainError> for PaymentError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::UserNotFound => {
                // The id is not recoverable from a generic DomainError.
                PaymentError::Storage(err.message)
            }
            ErrorCode::DatabaseError | ErrorCode::InternalError => {
                PaymentError::Storage(err.message)
            }
            _ => PaymentError::Storage(err.to_string()),
        }
    }
}
