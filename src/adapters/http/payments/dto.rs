//! HTTP DTOs (Data Transfer Objects) for payment endpoints.
//!
//! These types define the JSON request/response structure for the payments
//! API. They serve as the boundary between HTTP and the application layer.

use serde::{Deserialize, Serialize};

use crate::domain::payment::Payment;
use crate::domain::subscription::UserTariff;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Storefront webhook payload.
///
/// Every field is optional on the wire; the reconciler decides which absences
/// are fatal and answers with a field-specific 400.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentWebhookRequest {
    /// Opaque receipt blob (Apple receipt or Google purchase token).
    pub receipt: Option<String>,
    /// The account the purchase belongs to.
    pub user_id: Option<i64>,
    /// Provider tag: "apple" or "google".
    pub provider: Option<String>,
    /// App identifier override; falls back to the configured default.
    pub bundle_id: Option<String>,
    /// Storefront product id; required for Google receipts.
    pub product_id: Option<String>,
    /// ISO 4217 currency; defaults to USD.
    pub currency: Option<String>,
}

/// Request to create a manual payment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentRequest {
    /// Target user; defaults to the authenticated caller.
    #[serde(default)]
    pub user_id: Option<i64>,
    /// Amount in minor currency units.
    pub amount_cents: i64,
    /// ISO 4217 currency code.
    pub currency: String,
}

/// Query parameters for listing payments.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPaymentsParams {
    /// Target user; admins may list any user, defaults to the caller.
    pub user_id: Option<i64>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Query parameters for listing subscription grants.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListSubscriptionsParams {
    /// Target user; admins may list any user, defaults to the caller.
    pub user_id: Option<i64>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Terminal success of a webhook delivery.
///
/// A fresh grant carries the created row ids; a redelivery carries only the
/// original payment id.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookResponse {
    pub msg: &'static str,
    pub payment_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_tariff_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tariff_id: Option<i64>,
}

/// One payment row.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentResponse {
    pub id: i64,
    pub user_id: i64,
    pub amount_cents: i64,
    pub currency: String,
    pub provider: String,
    pub status: String,
    pub provider_transaction_id: Option<String>,
    /// ISO 8601.
    pub created_at: String,
    /// ISO 8601.
    pub updated_at: String,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id.as_i64(),
            user_id: payment.user_id.as_i64(),
            amount_cents: payment.amount_cents,
            currency: payment.currency,
            provider: payment.provider.as_str().to_string(),
            status: payment.status.as_str().to_string(),
            provider_transaction_id: payment.provider_transaction_id,
            created_at: payment.created_at.as_datetime().to_rfc3339(),
            updated_at: payment.updated_at.as_datetime().to_rfc3339(),
        }
    }
}

/// Paginated payment listing.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentListResponse {
    pub payments: Vec<PaymentResponse>,
}

/// One subscription grant.
#[derive(Debug, Clone, Serialize)]
pub struct UserTariffResponse {
    pub id: i64,
    pub user_id: i64,
    pub tariff_id: i64,
    /// ISO 8601.
    pub started_at: String,
    /// ISO 8601; null for lifetime grants.
    pub ended_at: Option<String>,
    pub status: String,
}

impl From<UserTariff> for UserTariffResponse {
    fn from(grant: UserTariff) -> Self {
        Self {
            id: grant.id.as_i64(),
            user_id: grant.user_id.as_i64(),
            tariff_id: grant.tariff_id.as_i64(),
            started_at: grant.started_at.as_datetime().to_rfc3339(),
            ended_at: grant.ended_at.map(|t| t.as_datetime().to_rfc3339()),
            status: grant.status.as_str().to_string(),
        }
    }
}

/// Subscription grant listing.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionListResponse {
    pub subscriptions: Vec<UserTariffResponse>,
}

/// Standard error envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
