//! Adapters: concrete implementations of the ports against the outside
//! world (HTTP, PostgreSQL, storefront verification APIs).

pub mod http;
pub mod iap;
pub mod postgres;
