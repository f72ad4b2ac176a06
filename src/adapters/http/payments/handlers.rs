//! HTTP handlers for payment endpoints.
//!
//! These handlers connect Axum routes to application layer command/query
//! handlers.

use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::payments::{
    CreatePaymentCommand, CreatePaymentHandler, GetPaymentHandler, GetPaymentQuery,
    ListPaymentsHandler, ListPaymentsQuery, ListSubscriptionsHandler, ListSubscriptionsQuery,
    ReconcileWebhookCommand, ReconcileWebhookHandler, ReconcileWebhookResult,
};
use crate::application::Actor;
use crate::domain::catalog::ProductCatalog;
use crate::domain::foundation::{PaymentId, UserId};
use crate::domain::payment::PaymentError;
use crate::ports::{
    PaymentLedger, ReceiptValidator, SubscriptionStore, TariffReader, UserDirectory,
};

use super::dto::{
    CreatePaymentRequest, ErrorResponse, ListPaymentsParams, ListSubscriptionsParams,
    PaymentListResponse, PaymentResponse, PaymentWebhookRequest, SubscriptionListResponse,
    UserTariffResponse, WebhookResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// This struct is cloned for each request and contains Arc-wrapped
/// dependencies for efficient sharing across handlers.
#[derive(Clone)]
pub struct PaymentsAppState {
    pub receipt_validator: Arc<dyn ReceiptValidator>,
    pub catalog: Arc<ProductCatalog>,
    pub tariff_reader: Arc<dyn TariffReader>,
    pub user_directory: Arc<dyn UserDirectory>,
    pub ledger: Arc<dyn PaymentLedger>,
    pub subscription_store: Arc<dyn SubscriptionStore>,
    pub default_bundle_id: String,
}

impl PaymentsAppState {
    /// Create handlers on demand from the shared state.
    pub fn webhook_handler(&self) -> ReconcileWebhookHandler {
        ReconcileWebhookHandler::new(
            self.receipt_validator.clone(),
            self.catalog.clone(),
            self.tariff_reader.clone(),
            self.user_directory.clone(),
            self.ledger.clone(),
            self.subscription_store.clone(),
            self.default_bundle_id.clone(),
        )
    }

    pub fn create_payment_handler(&self) -> CreatePaymentHandler {
        CreatePaymentHandler::new(self.ledger.clone(), self.user_directory.clone())
    }

    pub fn get_payment_handler(&self) -> GetPaymentHandler {
        GetPaymentHandler::new(self.ledger.clone())
    }

    pub fn list_payments_handler(&self) -> ListPaymentsHandler {
        ListPaymentsHandler::new(self.ledger.clone())
    }

    pub fn list_subscriptions_handler(&self) -> ListSubscriptionsHandler {
        ListSubscriptionsHandler::new(self.subscription_store.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// User Context (would come from auth middleware in production)
// ════════════════════════════════════════════════════════════════════════════════

/// Authenticated user context extracted from request.
///
/// In production, this would be extracted from JWT/session by auth
/// middleware. For now, uses a header-based extraction for
/// development/testing.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub is_admin: bool,
}

impl AuthenticatedUser {
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.user_id,
            is_admin: self.is_admin,
        }
    }
}

/// Rejection type for AuthenticatedUser extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            // In production, this would validate a JWT from the Authorization
            // header. For development, we accept X-User-Id and X-Admin-Role.
            let user_id = parts
                .headers
                .get("X-User-Id")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<UserId>().ok())
                .ok_or(AuthenticationRequired)?;

            let is_admin = parts
                .headers
                .get("X-Admin-Role")
                .and_then(|v| v.to_str().ok())
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false);

            Ok(AuthenticatedUser { user_id, is_admin })
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook Handler (no auth; called by the mobile backend)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/payments/webhook - Reconcile a storefront purchase
pub async fn handle_payment_webhook(
    State(state): State<PaymentsAppState>,
    Json(request): Json<PaymentWebhookRequest>,
) -> Result<impl IntoResponse, PaymentsApiError> {
    let handler = state.webhook_handler();
    let cmd = ReconcileWebhookCommand {
        receipt: request.receipt,
        user_id: request.user_id,
        provider: request.provider,
        bundle_id: request.bundle_id,
        product_id: request.product_id,
        currency: request.currency,
    };

    let result = handler.handle(cmd).await?;

    let response = match result {
        ReconcileWebhookResult::Granted {
            payment_id,
            user_tariff_id,
            tariff_id,
        } => WebhookResponse {
            msg: "Payment processed successfully",
            payment_id: payment_id.as_i64(),
            user_tariff_id: Some(user_tariff_id.as_i64()),
            tariff_id: Some(tariff_id.as_i64()),
        },
        ReconcileWebhookResult::AlreadyProcessed { payment_id } => WebhookResponse {
            msg: "Payment already processed",
            payment_id: payment_id.as_i64(),
            user_tariff_id: None,
            tariff_id: None,
        },
    };

    Ok(Json(response))
}

// ════════════════════════════════════════════════════════════════════════════════
// CRUD Handlers (require authentication)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/payments - Create a manual payment
pub async fn create_payment(
    State(state): State<PaymentsAppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, PaymentsApiError> {
    let handler = state.create_payment_handler();
    let cmd = CreatePaymentCommand {
        actor: user.actor(),
        user_id: request.user_id.map(UserId::from_i64).unwrap_or(user.user_id),
        amount_cents: request.amount_cents,
        currency: request.currency,
    };

    let payment = handler.handle(cmd).await?;

    Ok((StatusCode::CREATED, Json(PaymentResponse::from(payment))))
}

/// GET /api/payments - List payments for a user
pub async fn list_payments(
    State(state): State<PaymentsAppState>,
    user: AuthenticatedUser,
    Query(params): Query<ListPaymentsParams>,
) -> Result<impl IntoResponse, PaymentsApiError> {
    let handler = state.list_payments_handler();
    let query = ListPaymentsQuery {
        actor: user.actor(),
        user_id: params.user_id.map(UserId::from_i64),
        skip: params.skip,
        limit: params.limit,
    };

    let payments = handler.handle(query).await?;

    let response = PaymentListResponse {
        payments: payments.into_iter().map(PaymentResponse::from).collect(),
    };
    Ok(Json(response))
}

/// GET /api/payments/:id - Fetch one payment
pub async fn get_payment(
    State(state): State<PaymentsAppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, PaymentsApiError> {
    let handler = state.get_payment_handler();
    let query = GetPaymentQuery {
        actor: user.actor(),
        payment_id: PaymentId::from_i64(id),
    };

    let payment = handler.handle(query).await?;

    Ok(Json(PaymentResponse::from(payment)))
}

/// GET /api/subscriptions - List subscription grants for a user
pub async fn list_subscriptions(
    State(state): State<PaymentsAppState>,
    user: AuthenticatedUser,
    Query(params): Query<ListSubscriptionsParams>,
) -> Result<impl IntoResponse, PaymentsApiError> {
    let handler = state.list_subscriptions_handler();
    let query = ListSubscriptionsQuery {
        actor: user.actor(),
        user_id: params.user_id.map(UserId::from_i64),
    };

    let grants = handler.handle(query).await?;

    let response = SubscriptionListResponse {
        subscriptions: grants.into_iter().map(UserTariffResponse::from).collect(),
    };
    Ok(Json(response))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Mapping
// ════════════════════════════════════════════════════════════════════════════════

/// Wrapper adapting PaymentError to an HTTP response.
pub struct PaymentsApiError(PaymentError);

impl From<PaymentError> for PaymentsApiError {
    fn from(err: PaymentError) -> Self {
        PaymentsApiError(err)
    }
}

impl IntoResponse for PaymentsApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            PaymentError::MissingField(_)
            | PaymentError::UnknownProvider(_)
            | PaymentError::UnknownProduct(_)
            | PaymentError::InvalidReceipt { .. } => StatusCode::BAD_REQUEST,
            PaymentError::UserNotFound(_)
            | PaymentError::TariffNotFound(_)
            | PaymentError::PaymentNotFound(_) => StatusCode::NOT_FOUND,
            PaymentError::Forbidden => StatusCode::FORBIDDEN,
            PaymentError::StorefrontUnavailable { .. } => StatusCode::BAD_GATEWAY,
            PaymentError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        if self.0.is_retryable() {
            tracing::warn!(error = %self.0, "payment request failed, caller may retry");
        }

        let body = ErrorResponse::new(self.0.code().to_string(), self.0.message());
        (status, Json(body)).into_response()
    }
}
