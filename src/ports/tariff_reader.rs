//! Tariff reader port.

use async_trait::async_trait;

use crate::domain::catalog::Tariff;
use crate::domain::foundation::{DomainError, TariffId};

/// Read-only access to the tariff catalog storage.
#[async_trait]
pub trait TariffReader: Send + Sync {
    /// Fetches a tariff by id.
    async fn find_by_id(&self, id: TariffId) -> Result<Option<Tariff>, DomainError>;
}
