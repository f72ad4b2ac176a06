//! VPN API - Subscription backend with storefront receipt reconciliation
//!
//! This crate turns Apple and Google in-app purchase webhooks into an
//! idempotent payment ledger and time-bounded subscription grants.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
