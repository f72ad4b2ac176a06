//! UserTariff entity - one period of entitlement for a user to a tariff.
//!
//! # Invariants
//!
//! - `ended_at`, when present, is strictly after `started_at`
//! - a lifetime grant (catalog duration of 100 years or more) has
//!   `ended_at = None`
//! - rows are created by the ledger transaction and mutated only by the
//!   expiry sweep, which flips Active to Expired once `ended_at <= now`

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{TariffId, Timestamp, UserId, UserTariffId};

/// Lifecycle status of a subscription grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserTariffStatus {
    Active,
    Expired,
}

impl UserTariffStatus {
    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserTariffStatus::Active => "active",
            UserTariffStatus::Expired => "expired",
        }
    }

    /// Parses the storage representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(UserTariffStatus::Active),
            "expired" => Some(UserTariffStatus::Expired),
            _ => None,
        }
    }
}

/// A persisted subscription grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTariff {
    /// Internally assigned identifier.
    pub id: UserTariffId,

    /// User holding the entitlement.
    pub user_id: UserId,

    /// Tariff the entitlement is for.
    pub tariff_id: TariffId,

    /// Start of the entitlement period.
    pub started_at: Timestamp,

    /// End of the entitlement period; None means lifetime.
    pub ended_at: Option<Timestamp>,

    /// Active or expired.
    pub status: UserTariffStatus,
}

impl UserTariff {
    /// Whether the grant has lapsed relative to `now`.
    ///
    /// Lifetime grants never lapse.
    pub fn is_lapsed(&self, now: Timestamp) -> bool {
        match self.ended_at {
            Some(ended_at) => ended_at <= now,
            None => false,
        }
    }
}

/// A subscription grant not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserTariff {
    pub user_id: UserId,
    pub tariff_id: TariffId,
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
    pub status: UserTariffStatus,
}
