//! CreatePaymentHandler - manual payment creation outside the webhook path.
//!
//! Used by support tooling and by admins backfilling payments the storefront
//! never reported. Manual payments start pending and carry no transaction
//! id, so they never collide with the webhook idempotency key.

use std::sync::Arc;

use crate::application::actor::Actor;
use crate::domain::foundation::UserId;
use crate::domain::payment::{NewPayment, Payment, PaymentError};
use crate::ports::{PaymentLedger, UserDirectory};

#[derive(Debug, Clone)]
pub struct CreatePaymentCommand {
    pub actor: Actor,
    pub user_id: UserId,
    pub amount_cents: i64,
    pub currency: String,
}

pub struct CreatePaymentHandler {
    ledger: Arc<dyn PaymentLedger>,
    user_directory: Arc<dyn UserDirectory>,
}

impl CreatePaymentHandler {
    pub fn new(ledger: Arc<dyn PaymentLedger>, user_directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            ledger,
            user_directory,
        }
    }

    pub async fn handle(&self, cmd: CreatePaymentCommand) -> Result<Payment, PaymentError> {
        if !cmd.actor.can_access(cmd.user_id) {
            return Err(PaymentError::Forbidden);
        }
        if cmd.amount_cents <= 0 {
            return Err(PaymentError::missing_field("Amount"));
        }
        if cmd.currency.len() != 3 {
            return Err(PaymentError::invalid_receipt("currency must be ISO 4217"));
        }

        if !self
            .user_directory
            .exists(cmd.user_id)
            .await
            .map_err(|e| PaymentError::storage(e.to_string()))?
        {
            return Err(PaymentError::user_not_found(cmd.user_id));
        }

        let payment = self
            .ledger
            .insert(NewPayment::manual(
                cmd.user_id,
                cmd.amount_cents,
                cmd.currency.to_uppercase(),
            ))
            .await
            .map_err(|e| PaymentError::storage(e.to_string()))?;

        tracing::info!(
            payment_id = %payment.id,
            user_id = %payment.user_id,
            "manual payment created"
        );
        Ok(payment)
    }
}
