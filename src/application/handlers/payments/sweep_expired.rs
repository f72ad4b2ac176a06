//! SweepExpiredSubscriptionsHandler - transitions lapsed grants to expired.
//!
//! Runs from two triggers: the periodic background schedule and the
//! fire-and-forget task spawned after each successful webhook reconciliation.
//! Both call the same handler; the sweep is idempotent so overlap is
//! harmless.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::SubscriptionStore;

pub struct SweepExpiredSubscriptionsHandler {
    subscription_store: Arc<dyn SubscriptionStore>,
}

impl SweepExpiredSubscriptionsHandler {
    pub fn new(subscription_store: Arc<dyn SubscriptionStore>) -> Self {
        Self { subscription_store }
    }

    /// Expires every active grant whose `ended_at` is at or before now.
    /// Returns the number of grants transitioned.
    pub async fn handle(&self) -> Result<u64, DomainError> {
        let count = self
            .subscription_store
            .sweep_expired(Timestamp::now())
            .await?;
        if count > 0 {
            tracing::info!(count, "expired subscriptions swept");
        }
        Ok(count)
    }
}
