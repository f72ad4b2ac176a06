//! HTTP surface for payments and subscription grants.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{AuthenticatedUser, PaymentsApiError, PaymentsAppState};
pub use routes::{payments_router, payments_routes};
