//! Storefront product to tariff mapping.
//!
//! A small, rarely-changing keyed lookup. Loaded once at process start from
//! configuration, with a compiled-in default table; a miss is a first-class
//! NotFound outcome handled by the reconciler, never an internal error.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::TariffId;

/// One product mapping: storefront product id -> tariff and its duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub tariff_id: i64,

    /// Entitlement length in days; None means lifetime.
    pub duration_days: Option<i64>,
}

static DEFAULT_ENTRIES: Lazy<HashMap<String, CatalogEntry>> = Lazy::new(|| {
    HashMap::from([
        (
            "monthly_sub".to_string(),
            CatalogEntry {
                tariff_id: 1,
                duration_days: Some(30),
            },
        ),
        (
            "yearly_sub".to_string(),
            CatalogEntry {
                tariff_id: 2,
                duration_days: Some(365),
            },
        ),
        (
            "lifetime_sub".to_string(),
            CatalogEntry {
                tariff_id: 3,
                duration_days: None,
            },
        ),
    ])
});

/// Read-only product-to-tariff lookup.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl ProductCatalog {
    /// Builds a catalog from explicit entries (configuration-supplied).
    pub fn new(entries: HashMap<String, CatalogEntry>) -> Self {
        Self { entries }
    }

    /// The compiled-in default table.
    pub fn with_defaults() -> Self {
        Self {
            entries: DEFAULT_ENTRIES.clone(),
        }
    }

    /// Translates a storefront product id to its tariff.
    pub fn tariff_for(&self, product_id: &str) -> Option<TariffId> {
        self.entries
            .get(product_id)
            .map(|e| TariffId::from_i64(e.tariff_id))
    }

    /// Entitlement duration for a tariff, in days.
    ///
    /// Outer None: tariff not in the catalog. Inner None: lifetime.
    pub fn duration_days(&self, tariff_id: TariffId) -> Option<Option<i64>> {
        self.entries
            .values()
            .find(|e| e.tariff_id == tariff_id.as_i64())
            .map(|e| e.duration_days)
    }
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}
