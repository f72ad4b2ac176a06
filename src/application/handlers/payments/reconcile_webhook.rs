//! ReconcileWebhookHandler - converts a storefront webhook into a payment
//! row and a subscription grant, exactly once per transaction id.
//!
//! State machine per incoming call:
//! `received -> validating -> mapping -> ledger_check -> granting -> done`,
//! with a short-circuit to done when the transaction id was already applied
//! and a classified failure exit at any state.

use std::sync::Arc;

use crate::domain::catalog::ProductCatalog;
use crate::domain::foundation::{PaymentId, TariffId, Timestamp, UserId, UserTariffId};
use crate::domain::payment::{NewPayment, PaymentError, PaymentProvider};
use crate::domain::subscription::SubscriptionGrantor;
use crate::ports::{
    LedgerOutcome, PaymentLedger, ReceiptError, ReceiptValidationRequest, ReceiptValidator,
    SubscriptionStore, TariffReader, UserDirectory,
};

/// Raw webhook payload, unvalidated.
#[derive(Debug, Clone, Default)]
pub struct ReconcileWebhookCommand {
    pub receipt: Option<String>,
    pub user_id: Option<i64>,
    pub provider: Option<String>,
    pub bundle_id: Option<String>,
    pub product_id: Option<String>,
    pub currency: Option<String>,
}

/// Terminal success of the reconciliation state machine.
///
/// `AlreadyProcessed` is a success, not an error: storefronts deliver
/// at-least-once and must receive a success status on redelivery, but
/// callers need to tell the two apart so they don't double-count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileWebhookResult {
    Granted {
        payment_id: PaymentId,
        user_tariff_id: UserTariffId,
        tariff_id: TariffId,
    },
    AlreadyProcessed {
        payment_id: PaymentId,
    },
}

/// Handler sequencing validation, mapping, the idempotent ledger insert, and
/// the follow-up expiry sweep.
pub struct ReconcileWebhookHandler {
    receipt_validator: Arc<dyn ReceiptValidator>,
    catalog: Arc<ProductCatalog>,
    tariff_reader: Arc<dyn TariffReader>,
    user_directory: Arc<dyn UserDirectory>,
    ledger: Arc<dyn PaymentLedger>,
    subscription_store: Arc<dyn SubscriptionStore>,
    grantor: SubscriptionGrantor,
    default_app_id: String,
}

impl ReconcileWebhookHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        receipt_validator: Arc<dyn ReceiptValidator>,
        catalog: Arc<ProductCatalog>,
        tariff_reader: Arc<dyn TariffReader>,
        user_directory: Arc<dyn UserDirectory>,
        ledger: Arc<dyn PaymentLedger>,
        subscription_store: Arc<dyn SubscriptionStore>,
        default_app_id: impl Into<String>,
    ) -> Self {
        Self {
            receipt_validator,
            catalog,
            tariff_reader,
            user_directory,
            ledger,
            subscription_store,
            grantor: SubscriptionGrantor,
            default_app_id: default_app_id.into(),
        }
    }

    pub async fn handle(
        &self,
        cmd: ReconcileWebhookCommand,
    ) -> Result<ReconcileWebhookResult, PaymentError> {
        // received -> validating: structural checks, no side effects.
        let receipt = match cmd.receipt.as_deref() {
            Some(r) if !r.is_empty() => r.to_string(),
            _ => return Err(PaymentError::missing_field("Receipt")),
        };
        let user_id = match cmd.user_id {
            Some(id) => UserId::from_i64(id),
            None => return Err(PaymentError::missing_field("User ID")),
        };
        let provider_tag = cmd
            .provider
            .as_deref()
            .ok_or(PaymentError::missing_field("Provider"))?;
        let provider = match PaymentProvider::parse(provider_tag) {
            Some(p) if p.is_storefront() => p,
            _ => return Err(PaymentError::unknown_provider(provider_tag)),
        };

        if !self
            .user_directory
            .exists(user_id)
            .await
            .map_err(|e| PaymentError::storage(e.to_string()))?
        {
            return Err(PaymentError::user_not_found(user_id));
        }

        // validating -> mapping: the outbound verification call.
        let request = ReceiptValidationRequest {
            provider,
            receipt,
            app_id: cmd
                .bundle_id
                .clone()
                .unwrap_or_else(|| self.default_app_id.clone()),
            product_id: cmd.product_id.clone(),
        };
        let normalized = self
            .receipt_validator
            .validate(request)
            .await
            .map_err(|e| match e {
                ReceiptError::Malformed(reason) | ReceiptError::Rejected(reason) => {
                    PaymentError::invalid_receipt(reason)
                }
                ReceiptError::Unavailable(reason) => PaymentError::storefront_unavailable(reason),
            })?;

        if normalized.transaction_id.is_empty() || normalized.product_id.is_empty() {
            return Err(PaymentError::invalid_receipt(
                "receipt missing transaction_id or product_id",
            ));
        }

        // mapping -> ledger_check: pure catalog lookup plus tariff read.
        let tariff_id = self
            .catalog
            .tariff_for(&normalized.product_id)
            .ok_or_else(|| PaymentError::unknown_product(&normalized.product_id))?;
        let duration_days = self.catalog.duration_days(tariff_id).flatten();

        let tariff = self
            .tariff_reader
            .find_by_id(tariff_id)
            .await
            .map_err(|e| PaymentError::storage(e.to_string()))?
            .ok_or(PaymentError::tariff_not_found(tariff_id))?;

        // granting: duration arithmetic is pure; persistence is one atomic
        // unit of work with the payment insert.
        let now = Timestamp::now();
        let started_at = self.grantor.starting_at(normalized.purchase_date, now);
        let grant = self
            .grantor
            .grant(user_id, tariff_id, duration_days, started_at);

        if let Some(reported) = normalized.expiry_date {
            if grant.ended_at != Some(reported) {
                tracing::warn!(
                    transaction_id = %normalized.transaction_id,
                    tariff_id = %tariff_id,
                    reported_expiry = %reported.as_datetime(),
                    "storefront-reported expiry differs from catalog duration; catalog wins"
                );
            }
        }

        let payment = NewPayment::completed_from_receipt(
            user_id,
            tariff.price_cents,
            cmd.currency.clone().unwrap_or_else(|| "USD".to_string()),
            provider,
            normalized.transaction_id.clone(),
        );

        let outcome = self
            .ledger
            .record_if_new(payment, grant)
            .await
            .map_err(|e| PaymentError::storage(e.to_string()))?;

        // done: the sweep is a follow-up task, never on the response path.
        self.schedule_sweep();

        match outcome {
            LedgerOutcome::Recorded { payment, grant } => {
                tracing::info!(
                    payment_id = %payment.id,
                    user_tariff_id = %grant.id,
                    tariff_id = %tariff_id,
                    provider = %provider,
                    "payment recorded and subscription granted"
                );
                Ok(ReconcileWebhookResult::Granted {
                    payment_id: payment.id,
                    user_tariff_id: grant.id,
                    tariff_id,
                })
            }
            LedgerOutcome::AlreadyProcessed { payment } => {
                tracing::info!(
                    payment_id = %payment.id,
                    transaction_id = ?payment.provider_transaction_id,
                    "webhook redelivery for an already processed transaction"
                );
                Ok(ReconcileWebhookResult::AlreadyProcessed {
                    payment_id: payment.id,
                })
            }
        }
    }

    /// Fire-and-forget expiry sweep; failures are logged, never surfaced.
    fn schedule_sweep(&self) {
        let store = self.subscription_store.clone();
        tokio::spawn(async move {
            match store.sweep_expired(Timestamp::now()).await {
                Ok(0) => {}
                Ok(count) => tracing::info!(count, "expired subscriptions swept"),
                Err(e) => tracing::warn!(error = %e, "expiry sweep failed"),
            }
        });
    }
}
