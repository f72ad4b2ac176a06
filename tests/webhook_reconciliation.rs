//! Integration tests for the webhook reconciliation flow.
//!
//! These tests drive the crate's public surface end to end with in-memory
//! adapters: webhook delivery, redelivery, the CRUD read side, and the
//! expiry sweep working over the same stored rows.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use vpn_api::adapters::http::payments::PaymentsAppState;
use vpn_api::application::handlers::payments::{
    GetPaymentQuery, ListPaymentsQuery, ReconcileWebhookCommand, ReconcileWebhookResult,
    SweepExpiredSubscriptionsHandler,
};
use vpn_api::application::Actor;
use vpn_api::domain::catalog::{ProductCatalog, Tariff};
use vpn_api::domain::foundation::{
    DomainError, PaymentId, TariffId, Timestamp, UserId, UserTariffId,
};
use vpn_api::domain::payment::{NewPayment, Payment, PaymentError, PaymentStatus};
use vpn_api::domain::subscription::{NewUserTariff, UserTariff, UserTariffStatus};
use vpn_api::ports::{
    LedgerOutcome, NormalizedReceipt, PaymentLedger, ReceiptError, ReceiptValidationRequest,
    ReceiptValidator, SubscriptionStore, TariffReader, UserDirectory,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Shared in-memory storage backing both the ledger and the subscription
/// store, so webhook writes are visible to CRUD reads and the sweep.
#[derive(Default)]
struct InMemoryDb {
    payments: Mutex<Vec<Payment>>,
    grants: Mutex<Vec<UserTariff>>,
}

struct InMemoryLedger {
    db: Arc<InMemoryDb>,
}

#[async_trait]
impl PaymentLedger for InMemoryLedger {
    async fn record_if_new(
        &self,
        payment: NewPayment,
        grant: NewUserTariff,
    ) -> Result<LedgerOutcome, DomainError> {
        let mut payments = self.db.payments.lock().unwrap();
        let mut grants = self.db.grants.lock().unwrap();

        if let Some(existing) = payments
            .iter()
            .find(|p| p.provider_transaction_id == payment.provider_transaction_id)
        {
            return Ok(LedgerOutcome::AlreadyProcessed {
                payment: existing.clone(),
            });
        }

        let now = Timestamp::now();
        let stored_payment = Payment {
            id: PaymentId::from_i64(payments.len() as i64 + 1),
            user_id: payment.user_id,
            amount_cents: payment.amount_cents,
            currency: payment.currency,
            provider: payment.provider,
            status: payment.status,
            provider_transaction_id: payment.provider_transaction_id,
            created_at: now,
            updated_at: now,
        };
        let stored_grant = UserTariff {
            id: UserTariffId::from_i64(grants.len() as i64 + 1),
            user_id: grant.user_id,
            tariff_id: grant.tariff_id,
            started_at: grant.started_at,
            ended_at: grant.ended_at,
            status: grant.status,
        };
        payments.push(stored_payment.clone());
        grants.push(stored_grant.clone());

        Ok(LedgerOutcome::Recorded {
            payment: stored_payment,
            grant: stored_grant,
        })
    }

    async fn insert(&self, payment: NewPayment) -> Result<Payment, DomainError> {
        let mut payments = self.db.payments.lock().unwrap();
        let now = Timestamp::now();
        let stored = Payment {
            id: PaymentId::from_i64(payments.len() as i64 + 1),
            user_id: payment.user_id,
            amount_cents: payment.amount_cents,
            currency: payment.currency,
            provider: payment.provider,
            status: payment.status,
            provider_transaction_id: payment.provider_transaction_id,
            created_at: now,
            updated_at: now,
        };
        payments.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, DomainError> {
        Ok(self
            .db
            .payments
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Payment>, DomainError> {
        Ok(self
            .db
            .payments
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == user_id)
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

struct InMemorySubscriptionStore {
    db: Arc<InMemoryDb>,
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn sweep_expired(&self, now: Timestamp) -> Result<u64, DomainError> {
        let mut grants = self.db.grants.lock().unwrap();
        let mut count = 0;
        for grant in grants.iter_mut() {
            if grant.status == UserTariffStatus::Active && grant.is_lapsed(now) {
                grant.status = UserTariffStatus::Expired;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<UserTariff>, DomainError> {
        Ok(self
            .db
            .grants
            .lock()
            .unwrap()
            .iter()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect())
    }
}

struct StaticValidator {
    result: Result<NormalizedReceipt, ReceiptError>,
}

#[async_trait]
impl ReceiptValidator for StaticValidator {
    async fn validate(
        &self,
        _request: ReceiptValidationRequest,
    ) -> Result<NormalizedReceipt, ReceiptError> {
        self.result.clone()
    }
}

struct StaticTariffs;

#[async_trait]
impl TariffReader for StaticTariffs {
    async fn find_by_id(&self, id: TariffId) -> Result<Option<Tariff>, DomainError> {
        let tariff = match id.as_i64() {
            1 => Tariff {
                id,
                name: "Monthly".to_string(),
                price_cents: 999,
                duration_days: Some(30),
            },
            3 => Tariff {
                id,
                name: "Lifetime".to_string(),
                price_cents: 19_999,
                duration_days: None,
            },
            _ => return Ok(None),
        };
        Ok(Some(tariff))
    }
}

struct KnownUsers;

#[async_trait]
impl UserDirectory for KnownUsers {
    async fn exists(&self, id: UserId) -> Result<bool, DomainError> {
        Ok(id.as_i64() < 100)
    }
}

fn google_receipt(transaction_id: &str, product_id: &str) -> NormalizedReceipt {
    NormalizedReceipt {
        transaction_id: transaction_id.to_string(),
        product_id: product_id.to_string(),
        purchase_date: Timestamp::from_unix_millis(1_705_276_800_000),
        expiry_date: None,
    }
}

fn state_with(db: Arc<InMemoryDb>, receipt: NormalizedReceipt) -> PaymentsAppState {
    PaymentsAppState {
        receipt_validator: Arc::new(StaticValidator {
            result: Ok(receipt),
        }),
        catalog: Arc::new(ProductCatalog::with_defaults()),
        tariff_reader: Arc::new(StaticTariffs),
        user_directory: Arc::new(KnownUsers),
        ledger: Arc::new(InMemoryLedger { db: db.clone() }),
        subscription_store: Arc::new(InMemorySubscriptionStore { db }),
        default_bundle_id: "com.example.vpn".to_string(),
    }
}

fn webhook_command(user_id: i64) -> ReconcileWebhookCommand {
    ReconcileWebhookCommand {
        receipt: Some("purchase-token".to_string()),
        user_id: Some(user_id),
        provider: Some("google".to_string()),
        bundle_id: None,
        product_id: Some("monthly_sub".to_string()),
        currency: None,
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn google_purchase_flows_into_ledger_and_grant() {
    let db = Arc::new(InMemoryDb::default());
    let state = state_with(db.clone(), google_receipt("GPA.1111-2222", "monthly_sub"));

    let result = state
        .webhook_handler()
        .handle(webhook_command(1))
        .await
        .unwrap();

    let ReconcileWebhookResult::Granted {
        payment_id,
        user_tariff_id,
        tariff_id,
    } = result
    else {
        panic!("expected a fresh grant");
    };
    assert_eq!(tariff_id, TariffId::from_i64(1));

    let payments = db.payments.lock().unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].id, payment_id);
    assert_eq!(payments[0].amount_cents, 999);
    assert_eq!(payments[0].status, PaymentStatus::Completed);

    let grants = db.grants.lock().unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].id, user_tariff_id);
    let purchase = Timestamp::from_unix_millis(1_705_276_800_000).unwrap();
    assert_eq!(grants[0].started_at, purchase);
    assert_eq!(grants[0].ended_at, Some(purchase.add_days(30)));
}

#[tokio::test]
async fn redelivered_webhook_answers_already_processed() {
    let db = Arc::new(InMemoryDb::default());
    let state = state_with(db.clone(), google_receipt("GPA.3333-4444", "monthly_sub"));
    let handler = state.webhook_handler();

    let first = handler.handle(webhook_command(1)).await.unwrap();
    let second = handler.handle(webhook_command(1)).await.unwrap();

    let ReconcileWebhookResult::Granted { payment_id, .. } = first else {
        panic!("first delivery should grant");
    };
    assert_eq!(
        second,
        ReconcileWebhookResult::AlreadyProcessed { payment_id }
    );
    assert_eq!(db.payments.lock().unwrap().len(), 1);
    assert_eq!(db.grants.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn recorded_payment_is_visible_through_the_read_side() {
    let db = Arc::new(InMemoryDb::default());
    let state = state_with(db.clone(), google_receipt("GPA.5555-6666", "monthly_sub"));

    state
        .webhook_handler()
        .handle(webhook_command(7))
        .await
        .unwrap();

    let owner = Actor::user(UserId::from_i64(7));
    let listed = state
        .list_payments_handler()
        .handle(ListPaymentsQuery {
            actor: owner,
            user_id: None,
            skip: None,
            limit: None,
        })
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    let fetched = state
        .get_payment_handler()
        .handle(GetPaymentQuery {
            actor: owner,
            payment_id: listed[0].id,
        })
        .await
        .unwrap();
    assert_eq!(
        fetched.provider_transaction_id.as_deref(),
        Some("GPA.5555-6666")
    );

    // A stranger gets a 404-class error, not the row.
    let stranger = Actor::user(UserId::from_i64(8));
    let err = state
        .get_payment_handler()
        .handle(GetPaymentQuery {
            actor: stranger,
            payment_id: listed[0].id,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::PaymentNotFound(_)));
}

#[tokio::test]
async fn lifetime_grant_survives_the_sweep() {
    let db = Arc::new(InMemoryDb::default());
    let state = state_with(db.clone(), google_receipt("GPA.7777-8888", "lifetime_sub"));

    let cmd = ReconcileWebhookCommand {
        product_id: Some("lifetime_sub".to_string()),
        ..webhook_command(1)
    };
    state.webhook_handler().handle(cmd).await.unwrap();

    let sweeper = SweepExpiredSubscriptionsHandler::new(Arc::new(InMemorySubscriptionStore {
        db: db.clone(),
    }));
    assert_eq!(sweeper.handle().await.unwrap(), 0);

    let grants = db.grants.lock().unwrap();
    assert_eq!(grants[0].status, UserTariffStatus::Active);
    assert!(grants[0].ended_at.is_none());
}

#[tokio::test]
async fn sweep_expires_lapsed_grants_only() {
    let db = Arc::new(InMemoryDb::default());
    let past = Timestamp::now().add_days(-40);
    db.grants.lock().unwrap().extend([
        UserTariff {
            id: UserTariffId::from_i64(1),
            user_id: UserId::from_i64(1),
            tariff_id: TariffId::from_i64(1),
            started_at: past,
            ended_at: Some(past.add_days(30)),
            status: UserTariffStatus::Active,
        },
        UserTariff {
            id: UserTariffId::from_i64(2),
            user_id: UserId::from_i64(1),
            tariff_id: TariffId::from_i64(1),
            started_at: Timestamp::now(),
            ended_at: Some(Timestamp::now().add_days(30)),
            status: UserTariffStatus::Active,
        },
    ]);

    let sweeper = SweepExpiredSubscriptionsHandler::new(Arc::new(InMemorySubscriptionStore {
        db: db.clone(),
    }));
    assert_eq!(sweeper.handle().await.unwrap(), 1);

    let grants = db.grants.lock().unwrap();
    assert_eq!(grants[0].status, UserTariffStatus::Expired);
    assert_eq!(grants[1].status, UserTariffStatus::Active);

    // Running again transitions nothing further.
    drop(grants);
    assert_eq!(sweeper.handle().await.unwrap(), 0);
}

#[tokio::test]
async fn unknown_user_gets_not_found_with_no_rows_written() {
    let db = Arc::new(InMemoryDb::default());
    let state = state_with(db.clone(), google_receipt("GPA.9999-0000", "monthly_sub"));

    let err = state
        .webhook_handler()
        .handle(webhook_command(100))
        .await
        .unwrap_err();

    assert!(matches!(err, PaymentError::UserNotFound(_)));
    assert!(db.payments.lock().unwrap().is_empty());
    assert!(db.grants.lock().unwrap().is_empty());
}
