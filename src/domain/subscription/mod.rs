//! Subscription domain: entitlement periods granted from completed payments.

mod grantor;
mod user_tariff;

pub use grantor::{SubscriptionGrantor, LIFETIME_THRESHOLD_DAYS};
pub use user_tariff::{NewUserTariff, UserTariff, UserTariffStatus};
