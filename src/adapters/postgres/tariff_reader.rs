//! PostgreSQL implementation of the TariffReader port.

use crate::domain::catalog::Tariff;
use crate::domain::foundation::{DomainError, ErrorCode, TariffId};
use crate::ports::TariffReader;
use async_trait::async_trait;
use sqlx::PgPool;

/// PostgreSQL implementation of the TariffReader port.
pub struct PostgresTariffReader {
    pool: PgPool,
}

impl PostgresTariffReader {
    /// Creates a new PostgresTariffReader with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TariffRow {
    id: i64,
    name: String,
    price_cents: i64,
    duration_days: Option<i64>,
}

impl From<TariffRow> for Tariff {
    fn from(row: TariffRow) -> Self {
        Tariff {
            id: TariffId::from_i64(row.id),
            name: row.name,
            price_cents: row.price_cents,
            duration_days: row.duration_days,
        }
    }
}

#[async_trait]
impl TariffReader for PostgresTariffReader {
    async fn find_by_id(&self, id: TariffId) -> Result<Option<Tariff>, DomainError> {
        let row: Option<TariffRow> = sqlx::query_as(
            r#"
            SELECT id, name, price_cents, duration_days
            FROM tariffs
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find tariff: {}", e),
            )
        })?;

        Ok(row.map(Tariff::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_converts_to_tariff() {
        let row = TariffRow {
            id: 3,
            name: "Lifetime".to_string(),
            price_cents: 19_999,
            duration_days: None,
        };

        let tariff = Tariff::from(row);
        assert_eq!(tariff.id, TariffId::from_i64(3));
        assert_eq!(tariff.duration_days, None);
    }
}
