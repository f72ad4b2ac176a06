//! Foundation value objects shared across the domain.

mod errors;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode};
pub use ids::{PaymentId, TariffId, UserId, UserTariffId};
pub use timestamp::Timestamp;
