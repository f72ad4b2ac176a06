//! Axum router configuration for payment endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_payment, get_payment, handle_payment_webhook, list_payments, list_subscriptions,
    PaymentsAppState,
};

/// Create the payments API router.
///
/// # Routes
///
/// ## User Endpoints (require authentication)
/// - `POST /` - Create a manual payment
/// - `GET /` - List payments (admins may target any user)
/// - `GET /:id` - Fetch one payment
///
/// ## Webhook Endpoints (no user auth; called by the trusted mobile backend)
/// - `POST /webhook` - Reconcile a storefront purchase
pub fn payments_routes() -> Router<PaymentsAppState> {
    Router::new()
        .route("/", post(create_payment).get(list_payments))
        .route("/webhook", post(handle_payment_webhook))
        .route("/:id", get(get_payment))
}

/// Create the complete payments module router, suitable for mounting at
/// `/api`.
///
/// Alongside the payments routes it exposes `GET /subscriptions`, the read
/// side of the grants the webhook path creates.
pub fn payments_router() -> Router<PaymentsAppState> {
    Router::new()
        .nest("/payments", payments_routes())
        .route("/subscriptions", get(list_subscriptions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::catalog::{ProductCatalog, Tariff};
    use crate::domain::foundation::{DomainError, PaymentId, TariffId, Timestamp, UserId};
    use crate::domain::payment::{NewPayment, Payment};
    use crate::domain::subscription::{NewUserTariff, UserTariff};
    use crate::ports::{
        LedgerOutcome, NormalizedReceipt, PaymentLedger, ReceiptError, ReceiptValidationRequest,
        ReceiptValidator, SubscriptionStore, TariffReader, UserDirectory,
    };
    use async_trait::async_trait;

    struct StubValidator;

    #[async_trait]
    impl ReceiptValidator for StubValidator {
        async fn validate(
            &self,
            _request: ReceiptValidationRequest,
        ) -> Result<NormalizedReceipt, ReceiptError> {
            Err(ReceiptError::rejected("stub"))
        }
    }

    struct StubLedger;

    #[async_trait]
    impl PaymentLedger for StubLedger {
        async fn record_if_new(
            &self,
            _payment: NewPayment,
            _grant: NewUserTariff,
        ) -> Result<LedgerOutcome, DomainError> {
            unimplemented!()
        }

        async fn insert(&self, _payment: NewPayment) -> Result<Payment, DomainError> {
            unimplemented!()
        }

        async fn find_by_id(&self, _id: PaymentId) -> Result<Option<Payment>, DomainError> {
            Ok(None)
        }

        async fn list_for_user(
            &self,
            _user_id: UserId,
            _skip: i64,
            _limit: i64,
        ) -> Result<Vec<Payment>, DomainError> {
            Ok(vec![])
        }
    }

    struct StubStore;

    #[async_trait]
    impl SubscriptionStore for StubStore {
        async fn sweep_expired(&self, _now: Timestamp) -> Result<u64, DomainError> {
            Ok(0)
        }

        async fn list_for_user(&self, _user_id: UserId) -> Result<Vec<UserTariff>, DomainError> {
            Ok(vec![])
        }
    }

    struct StubTariffs;

    #[async_trait]
    impl TariffReader for StubTariffs {
        async fn find_by_id(&self, _id: TariffId) -> Result<Option<Tariff>, DomainError> {
            Ok(None)
        }
    }

    struct StubUsers;

    #[async_trait]
    impl UserDirectory for StubUsers {
        async fn exists(&self, _id: UserId) -> Result<bool, DomainError> {
            Ok(true)
        }
    }

    fn test_state() -> PaymentsAppState {
        PaymentsAppState {
            receipt_validator: Arc::new(StubValidator),
            catalog: Arc::new(ProductCatalog::with_defaults()),
            tariff_reader: Arc::new(StubTariffs),
            user_directory: Arc::new(StubUsers),
            ledger: Arc::new(StubLedger),
            subscription_store: Arc::new(StubStore),
            default_bundle_id: "com.example.vpn".to_string(),
        }
    }

    #[test]
    fn payments_routes_creates_router() {
        let router = payments_routes();
        let _: Router<()> = router.with_state(test_state());
    }

    #[test]
    fn payments_router_creates_combined_router() {
        let router = payments_router();
        let _: Router<()> = router.with_state(test_state());
    }
}
