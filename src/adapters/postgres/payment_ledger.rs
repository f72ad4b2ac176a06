//! PostgreSQL implementation of the PaymentLedger port.
//!
//! The idempotency guarantee rides on the partial unique index over
//! `(provider, provider_transaction_id)`: `record_if_new` runs the payment
//! insert with `ON CONFLICT DO NOTHING` and the grant insert inside one
//! transaction, so a redelivered or concurrent webhook can never commit a
//! second row pair.

use crate::domain::foundation::{
    DomainError, ErrorCode, PaymentId, Timestamp, UserId, UserTariffId,
};
use crate::domain::payment::{NewPayment, Payment, PaymentProvider, PaymentStatus};
use crate::domain::subscription::{NewUserTariff, UserTariff, UserTariffStatus};
use crate::ports::{LedgerOutcome, PaymentLedger};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// PostgreSQL implementation of the PaymentLedger port.
pub struct PostgresPaymentLedger {
    pool: PgPool,
}

impl PostgresPaymentLedger {
    /// Creates a new PostgresPaymentLedger with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a payment.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: i64,
    user_id: i64,
    amount_cents: i64,
    currency: String,
    provider: String,
    status: String,
    provider_transaction_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: PaymentId::from_i64(row.id),
            user_id: UserId::from_i64(row.user_id),
            amount_cents: row.amount_cents,
            currency: row.currency,
            provider: parse_provider(&row.provider)?,
            status: parse_status(&row.status)?,
            provider_transaction_id: row.provider_transaction_id,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

/// Database row representation of a subscription grant.
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
            tariff_id: crate::domain::foundation::TariffId::from_i64(row.tariff_id),
            started_at: Timestamp::from_datetime(row.started_at),
            ended_at: row.ended_at.map(Timestamp::from_datetime),
            status,
        })
    }
}

fn parse_provider(s: &str) -> Result<PaymentProvider, DomainError> {
    PaymentProvider::parse(s).ok_or_else(|| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid provider value: {}", s),
        )
    })
}

fn parse_status(s: &str) -> Result<PaymentStatus, DomainError> {
    PaymentStatus::parse(s).ok_or_else(|| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid payment status value: {}", s),
        )
    })
}

#[async_trait]
impl PaymentLedger for PostgresPaymentLedger {
    async fn record_if_new(
        &self,
        payment: NewPayment,
        grant: NewUserTariff,
    ) -> Result<LedgerOutcome, DomainError> {
        let transaction_id = payment.provider_transaction_id.as_deref().ok_or_else(|| {
            DomainError::new(
                ErrorCode::ValidationFailed,
                "record_if_new requires a provider transaction id",
            )
        })?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to begin transaction: {}", e),
            )
        })?;

        let now = Timestamp::now();
        let inserted: Option<PaymentRow> = sqlx::query_as(
            r#"
            INSERT INTO payments (
                user_id, amount_cents, currency, provider, status,
                provider_transaction_id, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            ON CONFLICT (provider, provider_transaction_id)
                WHERE provider_transaction_id IS NOT NULL
                DO NOTHING
            RETURNING id, user_id, amount_cents, currency, provider, status,
                      provider_transaction_id, created_at, updated_at
            "#,
        )
        .bind(payment.user_id.as_i64())
        .bind(payment.amount_cents)
        .bind(&payment.currency)
        .bind(payment.provider.as_str())
        .bind(payment.status.as_str())
        .bind(transaction_id)
        .bind(now.as_datetime())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert payment: {}", e),
            )
        })?;

        let Some(payment_row) = inserted else {
            // Conflict: another delivery already committed this transaction
            // id. Nothing to roll back; the insert wrote nothing.
            drop(tx);

            let existing: PaymentRow = sqlx::query_as(
                r#"
                SELECT id, user_id, amount_cents, currency, provider, status,
                       provider_transaction_id, created_at, updated_at
                FROM payments
                WHERE provider = $1 AND provider_transaction_id = $2
                "#,
            )
            .bind(payment.provider.as_str())
            .bind(transaction_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to load existing payment: {}", e),
                )
            })?;

            return Ok(LedgerOutcome::AlreadyProcessed {
                payment: existing.try_into()?,
            });
        };

        let grant_row: UserTariffRow = sqlx::query_as(
            r#"
            INSERT INTO user_tariffs (user_id, tariff_id, started_at, ended_at, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, tariff_id, started_at, ended_at, status
            "#,
        )
        .bind(grant.user_id.as_i64())
        .bind(grant.tariff_id.as_i64())
        .bind(grant.started_at.as_datetime())
        .bind(grant.ended_at.map(|t| t.as_datetime()))
        .bind(grant.status.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert subscription grant: {}", e),
            )
        })?;

        tx.commit().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to commit payment transaction: {}", e),
            )
        })?;

        Ok(LedgerOutcome::Recorded {
            payment: payment_row.try_into()?,
            grant: grant_row.try_into()?,
        })
    }

    async fn insert(&self, payment: NewPayment) -> Result<Payment, DomainError> {
        let now = Timestamp::now();
        let row: PaymentRow = sqlx::query_as(
            r#"
            INSERT INTO payments (
                user_id, amount_cents, currency, provider, status,
                provider_transaction_id, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING id, user_id, amount_cents, currency, provider, status,
                      provider_transaction_id, created_at, updated_at
            "#,
        )
        .bind(payment.user_id.as_i64())
        .bind(payment.amount_cents)
        .bind(&payment.currency)
        .bind(payment.provider.as_str())
        .bind(payment.status.as_str())
        .bind(&payment.provider_transaction_id)
        .bind(now.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert payment: {}", e),
            )
        })?;

        row.try_into()
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, amount_cents, currency, provider, status,
                   provider_transaction_id, created_at, updated_at
            FROM payments
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find payment: {}", e),
            )
        })?;

        row.map(Payment::try_from).transpose()
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Payment>, DomainError> {
        let rows: Vec<PaymentRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, amount_cents, currency, provider, status,
                   provider_transaction_id, created_at, updated_at
            FROM payments
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(user_id.as_i64())
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to list payments: {}", e),
            )
        })?;

        rows.into_iter().map(Payment::try_from).collect()
    }
}
