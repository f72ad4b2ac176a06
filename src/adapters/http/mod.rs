//! HTTP adapters - Axum handlers, DTOs, and routers.

pub mod payments;
