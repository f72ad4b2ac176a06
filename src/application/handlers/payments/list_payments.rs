//! ListPaymentsHandler - paginated payment listing scoped to the caller.

use std::sync::Arc;

use crate::application::actor::Actor;
use crate::domain::foundation::UserId;
use crate::domain::payment::{Payment, PaymentError};
use crate::ports::PaymentLedger;

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy)]
pub struct ListPaymentsQuery {
    pub actor: Actor,
    /// Target user; defaults to the actor. Admins may target anyone.
    pub user_id: Option<UserId>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

pub struct ListPaymentsHandler {
    ledger: Arc<dyn PaymentLedger>,
}

impl ListPaymentsHandler {
    pub fn new(ledger: Arc<dyn PaymentLedger>) -> Self {
        Self { ledger }
    }

    pub async fn handle(&self, query: ListPaymentsQuery) -> Result<Vec<Payment>, PaymentError> {
        let target = query.user_id.unwrap_or(query.actor.user_id);
        if !query.actor.can_access(target) {
            return Err(PaymentError::Forbidden);
        }

        let skip = query.skip.unwrap_or(0).max(0);
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

        self.ledger
            .list_for_user(target, skip, limit)
            .await
            .map_err(|e| PaymentError::storage(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainError, PaymentId};
    use crate::domain::payment::NewPayment;
    use crate::domain::subscription::NewUserTariff;
    use crate::ports::LedgerOutcome;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingLedger {
        calls: Mutex<Vec<(UserId, i64, i64)>>,
    }

    #[async_trait]
    impl PaymentLedger for RecordingLedger {
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
            user_id: UserId,
            skip: i64,
            limit: i64,
        ) -> Result<Vec<Payment>, DomainError> {
            self.calls.lock().unwrap().push((user_id, skip, limit));
            Ok(vec![])
        }
    }

    fn handler() -> (Arc<RecordingLedger>, ListPaymentsHandler) {
        let ledger = Arc::new(RecordingLedger {
            calls: Mutex::new(Vec::new()),
        });
        let handler = ListPaymentsHandler::new(ledger.clone());
        (ledger, handler)
    }

    #[tokio::test]
    async fn defaults_to_the_actor_with_sane_pagination() {
        let (ledger, handler) = handler();
        let query = ListPaymentsQuery {
            actor: Actor::user(UserId::from_i64(1)),
            user_id: None,
            skip: None,
            limit: None,
        };

        handler.handle(query).await.unwrap();

        let calls = ledger.calls.lock().unwrap();
        assert_eq!(calls[0], (UserId::from_i64(1), 0, DEFAULT_LIMIT));
    }

    #[tokio::test]
    async fn pagination_is_clamped() {
        let (ledger, handler) = handler();
        let query = ListPaymentsQuery {
            actor: Actor::user(UserId::from_i64(1)),
            user_id: None,
            skip: Some(-5),
            limit: Some(10_000),
        };

        handler.handle(query).await.unwrap();

        let calls = ledger.calls.lock().unwrap();
        assert_eq!(calls[0], (UserId::from_i64(1), 0, MAX_LIMIT));
    }

    #[tokio::test]
    async fn non_admin_cannot_list_another_users_payments() {
        let (ledger, handler) = handler();
        let query = ListPaymentsQuery {
            actor: Actor::user(UserId::from_i64(2)),
            user_id: Some(UserId::from_i64(1)),
            skip: None,
            limit: None,
        };

        let err = handler.handle(query).await.unwrap_err();
        assert_eq!(err, PaymentError::Forbidden);
        assert!(ledger.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn admin_lists_any_user() {
        let (ledger, handler) = handler();
        let query = ListPaymentsQuery {
            actor: Actor::admin(UserId::from_i64(99)),
            user_id: Some(UserId::from_i64(1)),
            skip: None,
            limit: Some(5),
        };

        handler.handle(query).await.unwrap();

        let calls = ledger.calls.lock().unwrap();
        assert_eq!(calls[0], (UserId::from_i64(1), 0, 5));
    }
}
