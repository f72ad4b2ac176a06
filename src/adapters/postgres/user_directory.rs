//! PostgreSQL implementation of the UserDirectory port.

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::UserDirectory;
use async_trait::async_trait;
use sqlx::PgPool;

/// PostgreSQL implementation of the UserDirectory port.
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    /// Creates a new PostgresUserDirectory with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn exists(&self, id: UserId) -> Result<bool, DomainError> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to look up user: {}", e),
                )
            })?;

        Ok(found.is_some())
    }
}
