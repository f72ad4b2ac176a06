//! Command and query handlers, one module per bounded area.

pub mod payments;
