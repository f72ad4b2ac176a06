//! SubscriptionGrantor - pure duration arithmetic for new grants.
//!
//! Computes the start and end of an entitlement period from the catalog
//! duration. Persistence happens in the ledger transaction; this type never
//! touches storage.

use crate::domain::foundation::{TariffId, Timestamp, UserId};

use super::{NewUserTariff, UserTariffStatus};

/// Catalog durations at or above this are treated as lifetime (100 years).
pub const LIFETIME_THRESHOLD_DAYS: i64 = 36_500;

/// Purchase dates further in the future than this are implausible and
/// replaced with the current time (storefront clock skew allowance).
const MAX_FUTURE_SKEW_HOURS: i64 = 24;

/// Builds subscription grants from validated payments.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubscriptionGrantor;

impl SubscriptionGrantor {
    /// Computes a new grant for `user_id` on `tariff_id`.
    ///
    /// A missing duration or one at/above [`LIFETIME_THRESHOLD_DAYS`] yields
    /// a lifetime grant (`ended_at = None`); otherwise
    /// `ended_at = started_at + duration_days`.
    pub fn grant(
        &self,
        user_id: UserId,
        tariff_id: TariffId,
        duration_days: Option<i64>,
        started_at: Timestamp,
    ) -> NewUserTariff {
        let ended_at = match duration_days {
            Some(days) if days < LIFETIME_THRESHOLD_DAYS => Some(started_at.add_days(days)),
            _ => None,
        };

        NewUserTariff {
            user_id,
            tariff_id,
            started_at,
            ended_at,
            status: UserTariffStatus::Active,
        }
    }

    /// Picks the grant start: the storefront-reported purchase date when
    /// present and plausible, else `now`.
    pub fn starting_at(&self, purchase_date: Option<Timestamp>, now: Timestamp) -> Timestamp {
        match purchase_date {
            Some(d) if d <= now.add_hours(MAX_FUTURE_SKEW_HOURS) => d,
            _ => now,
        }
    }
}
