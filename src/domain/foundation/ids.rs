//! Strongly-typed identifier value objects.
//!
//! All identifiers are database-assigned 64-bit integers (BIGSERIAL). The
//! newtypes exist so a payment id can never be passed where a tariff id is
//! expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Creates a UserId from a raw database value.
    pub fn from_i64(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw database value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Unique identifier for a payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(i64);

impl PaymentId {
    /// Creates a PaymentId from a raw database value.
    pub fn from_i64(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw database value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a tariff catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TariffId(i64);

impl TariffId {
    /// Creates a TariffId from a raw database value.
    pub fn from_i64(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw database value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for TariffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a user's subscription grant (a `user_tariffs` row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserTariffId(i64);

impl UserTariffId {
    /// Creates a UserTariffId from a raw database value.
    pub fn from_i64(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw database value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserTariffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
