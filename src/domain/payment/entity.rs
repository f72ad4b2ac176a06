//! Payment entity.
//!
//! One attempted or completed monetary event. Webhook-created payments are
//! completed immediately; manual payments start pending.
//!
//! # Design Decisions
//!
//! - **Money in cents**: monetary values stored as i64 cents (not floats)
//! - **Idempotency key**: `(provider, provider_transaction_id)` is unique at
//!   the database level; a redelivered webhook can never mint a second row
//! - **Append-biased**: the core never deletes payments and never mutates a
//!   completed one except bookkeeping timestamps

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PaymentId, Timestamp, UserId};

use super::PaymentProvider;

/// Lifecycle status of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }

    /// Parses the storage representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "completed" => Some(PaymentStatus::Completed),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

/// A persisted payment row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Internally assigned identifier.
    pub id: PaymentId,

    /// User the payment belongs to.
    pub user_id: UserId,

    /// Amount in minor currency units (cents).
    pub amount_cents: i64,

    /// ISO 4217 currency code.
    pub currency: String,

    /// Where the payment came from.
    pub provider: PaymentProvider,

    /// Lifecycle status.
    pub status: PaymentStatus,

    /// Storefront-assigned transaction id; the idempotency key.
    ///
    /// None for manual payments.
    pub provider_transaction_id: Option<String>,

    /// When the row was created.
    pub created_at: Timestamp,

    /// When the row was last updated.
    pub updated_at: Timestamp,
}

/// A payment not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub user_id: UserId,
    pub amount_cents: i64,
    pub currency: String,
    pub provider: PaymentProvider,
    pub status: PaymentStatus,
    pub provider_transaction_id: Option<String>,
}

impl NewPayment {
    /// A completed storefront payment, keyed by its transaction id.
    pub fn completed_from_receipt(
        user_id: UserId,
        amount_cents: i64,
        currency: impl Into<String>,
        provider: PaymentProvider,
        transaction_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            amount_cents,
            currency: currency.into(),
            provider,
            status: PaymentStatus::Completed,
            provider_transaction_id: Some(transaction_id.into()),
        }
    }

    /// A manually created payment awaiting settlement.
    pub fn manual(user_id: UserId, amount_cents: i64, currency: impl Into<String>) -> Self {
        Self {
            user_id,
            amount_cents,
            currency: currency.into(),
            provider: PaymentProvider::Manual,
            status: PaymentStatus::Pending,
            provider_transaction_id: None,
        }
    }
}
