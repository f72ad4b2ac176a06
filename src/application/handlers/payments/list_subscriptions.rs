//! ListSubscriptionsHandler - subscription grant listing scoped to the caller.

use std::sync::Arc;

use crate::application::actor::Actor;
use crate::domain::foundation::UserId;
use crate::domain::payment::PaymentError;
use crate::domain::subscription::UserTariff;
use crate::ports::SubscriptionStore;

#[derive(Debug, Clone, Copy)]
pub struct ListSubscriptionsQuery {
    pub actor: Actor,
    /// Target user; defaults to the actor. Admins may target anyone.
    pub user_id: Option<UserId>,
}

pub struct ListSubscriptionsHandler {
    store: Arc<dyn SubscriptionStore>,
}

impl ListSubscriptionsHandler {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        query: ListSubscriptionsQuery,
    ) -> Result<Vec<UserTariff>, PaymentError> {
        let target = query.user_id.unwrap_or(query.actor.user_id);
        if !query.actor.can_access(target) {
            return Err(PaymentError::Forbidden);
        }

        self.store
            .list_for_user(target)
            .await
            .map_err(|e| PaymentError::storage(e.to_string()))
    }
}
