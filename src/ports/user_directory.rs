//! User directory port.
//!
//! Account management is owned elsewhere; the reconciler only needs to know
//! whether a user id refers to a real account.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};

/// Minimal read access to user accounts.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Whether a user with this id exists.
    async fn exists(&self, id: UserId) -> Result<bool, DomainError>;
}
