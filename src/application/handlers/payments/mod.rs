//! Payment and subscription command handlers.

mod create_payment;
mod get_payment;
mod list_payments;
mod list_subscriptions;
mod reconcile_webhook;
mod sweep_expired;

pub use create_payment::{CreatePaymentCommand, CreatePaymentHandler};
pub use get_payment::{GetPaymentHandler, GetPaymentQuery};
pub use list_payments::{ListPaymentsHandler, ListPaymentsQuery};
pub use list_subscriptions::{ListSubscriptionsHandler, ListSubscriptionsQuery};
pub use reconcile_webhook::{
    ReconcileWebhookCommand, ReconcileWebhookHandler, ReconcileWebhookResult,
};
pub use sweep_expired::SweepExpiredSubscriptionsHandler;
