//! Tariff read model.
//!
//! Tariffs are owned by administrative CRUD; this core only reads them.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::TariffId;

/// A priced plan with a fixed entitlement duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tariff {
    pub id: TariffId,

    /// Display name, e.g. "Monthly".
    pub name: String,

    /// Price in minor currency units (cents).
    pub price_cents: i64,

    /// Entitlement length in days; None means lifetime.
    pub duration_days: Option<i64>,
}
