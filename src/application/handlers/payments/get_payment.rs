//! GetPaymentHandler - fetch one payment with ownership enforcement.

use std::sync::Arc;

use crate::application::actor::Actor;
use crate::domain::foundation::PaymentId;
use crate::domain::payment::{Payment, PaymentError};
use crate::ports::PaymentLedger;

#[derive(Debug, Clone, Copy)]
pub struct GetPaymentQuery {
    pub actor: Actor,
    pub payment_id: PaymentId,
}

pub struct GetPaymentHandler {
    ledger: Arc<dyn PaymentLedger>,
}

impl GetPaymentHandler {
    pub fn new(ledger: Arc<dyn PaymentLedger>) -> Self {
        Self { ledger }
    }

    pub async fn handle(&self, query: GetPaymentQuery) -> Result<Payment, PaymentError> {
        let payment = self
            .ledger
            .find_by_id(query.payment_id)
            .await
            .map_err(|e| PaymentError::storage(e.to_string()))?
            .ok_or(PaymentError::payment_not_found(query.payment_id))?;

        if !query.actor.can_access(payment.user_id) {
            // Existence is not leaked to strangers.
            return Err(PaymentError::payment_not_found(query.payment_id));
        }

        Ok(payment)
    }
}
