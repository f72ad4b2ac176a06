//! Payment ledger port.
//!
//! Append-biased record of payment attempts keyed by provider transaction id.
//! The ledger enforces at-most-one-effect semantics per transaction id: the
//! existence check, the payment insert, and the grant insert are one atomic
//! unit of work. A naive read-then-write is a correctness bug here, not an
//! acceptable simplification.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PaymentId, UserId};
use crate::domain::payment::{NewPayment, Payment};
use crate::domain::subscription::{NewUserTariff, UserTariff};

/// Outcome of an idempotent record attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerOutcome {
    /// First sighting of this transaction id: payment and grant were
    /// committed together.
    Recorded {
        payment: Payment,
        grant: UserTariff,
    },

    /// The transaction id had already been applied; the existing payment is
    /// returned and no new rows exist.
    AlreadyProcessed { payment: Payment },
}

/// Port for recording payments with exactly-once effect.
#[async_trait]
pub trait PaymentLedger: Send + Sync {
    /// Records `payment` and its `grant` if the payment's transaction id has
    /// not been seen before.
    ///
    /// Guarantee: concurrent calls carrying the same transaction id commit
    /// exactly one payment row and one grant row; every other caller
    /// observes [`LedgerOutcome::AlreadyProcessed`]. If the grant insert
    /// fails the payment insert rolls back with it.
    async fn record_if_new(
        &self,
        payment: NewPayment,
        grant: NewUserTariff,
    ) -> Result<LedgerOutcome, DomainError>;

    /// Inserts a payment outside the webhook path (manual/CRUD).
    async fn insert(&self, payment: NewPayment) -> Result<Payment, DomainError>;

    /// Fetches one payment.
    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, DomainError>;

    /// Lists payments for a user, newest first.
    async fn list_for_user(
        &self,
        user_id: UserId,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Payment>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_ledger_is_object_safe() {
        fn _accepts_dyn(_ledger: &dyn PaymentLedger) {}
    }
}
