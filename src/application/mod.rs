//! Application layer: orchestration between ports, no I/O of its own.

pub mod actor;
pub mod handlers;

pub use actor::Actor;
