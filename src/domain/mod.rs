//! Domain layer: entities, value objects, and pure business rules.

pub mod catalog;
pub mod foundation;
pub mod payment;
pub mod subscription;
