//! PostgreSQL implementation of the SubscriptionStore port.

use crate::domain::foundation::{
    DomainError, ErrorCode, TariffId, Timestamp, UserId, UserTariffId,
};
use crate::domain::subscription::{UserTariff, UserTariffStatus};
use crate::ports::SubscriptionStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// PostgreSQL implementation of the SubscriptionStore port.
pub struct PostgresSubscriptionStore {
    pool: PgPool,
}

impl PostgresSubscriptionStore {
    /// Creates a new PostgresSubscriptionStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserTariffRow {
    id: i64,
    user_id: i64,
    tariff_id: i64,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    status: String,
}

impl TryFrom<UserTariffRow> for UserTariff {
    type Error = DomainError;

    fn try_from(row: UserTariffRow) -> Result<Self, Self::Error> {
        let status = UserTariffStatus::parse(&row.status).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid user_tariff status value: {}", row.status),
            )
        })?;

        Ok(UserTariff {
            id: UserTariffId::from_i64(row.id),
            user_id: UserId::from_i64(row.user_id),
            tariff_id: TariffId::from_i64(row.tariff_id),
            started_at: Timestamp::from_datetime(row.started_at),
            ended_at: row.ended_at.map(Timestamp::from_datetime),
            status,
        })
    }
}

#[async_trait]
impl SubscriptionStore for PostgresSubscriptionStore {
    async fn sweep_expired(&self, now: Timestamp) -> Result<u64, DomainError> {
        // NULL ended_at rows (lifetime grants) never match the predicate, so
        // they can never be expired by the sweep. Status is part of the WHERE
        // clause, which makes the statement idempotent under overlap.
        let result = sqlx::query(
            r#"
            UPDATE user_tariffs
            SET status = 'expired'
            WHERE status = 'active' AND ended_at IS NOT NULL AND ended_at <= $1
            "#,
        )
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to sweep expired subscriptions: {}", e),
            )
        })?;

        Ok(result.rows_affected())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<UserTariff>, DomainError> {
        let rows: Vec<UserTariffRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, tariff_id, started_at, ended_at, status
            FROM user_tariffs
            WHERE user_id = $1
            ORDER BY started_at DESC, id DESC
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to list subscriptions: {}", e),
            )
        })?;

        rows.into_iter().map(UserTariff::try_from).collect()
    }
}
