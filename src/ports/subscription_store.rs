//! Subscription store port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::subscription::UserTariff;

/// Port over persisted subscription grants.
///
/// Grant creation happens inside the ledger transaction
/// ([`crate::ports::PaymentLedger::record_if_new`]); this port covers reads
/// and the expiry sweep.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Transitions every active grant with `ended_at <= now` to expired.
    ///
    /// Returns the number of rows transitioned. Safe to run concurrently
    /// with itself and with grant creation; each row transitions
    /// independently (read-matches-write on status), so running twice with
    /// the same `now` performs zero additional transitions the second time.
    async fn sweep_expired(&self, now: Timestamp) -> Result<u64, DomainError>;

    /// Lists a user's grants, newest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<UserTariff>, DomainError>;
}
