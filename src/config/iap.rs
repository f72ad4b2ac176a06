//! In-app purchase configuration

use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::catalog::{CatalogEntry, ProductCatalog};

use super::error::ValidationError;

/// In-app purchase configuration (Apple and Google receipt verification).
#[derive(Debug, Clone, Deserialize)]
pub struct IapConfig {
    /// Apple app-specific shared secret for verifyReceipt.
    #[serde(default)]
    pub apple_shared_secret: String,

    /// Google service account OAuth2 access token.
    #[serde(default)]
    pub google_access_token: String,

    /// Default app identifier (Apple bundle id / Google package name) when
    /// the webhook omits one.
    pub default_bundle_id: String,

    /// Outbound verification call timeout in seconds.
    #[serde(default = "default_verify_timeout")]
    pub verify_timeout_secs: u64,

    /// Background expiry sweep interval in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Product catalog override; empty means the compiled-in defaults.
    #[serde(default)]
    pub products: HashMap<String, CatalogEntry>,
}

impl IapConfig {
    /// Builds the product catalog from configuration, falling back to the
    /// compiled-in table when no override is present.
    pub fn product_catalog(&self) -> ProductCatalog {
        if self.products.is_empty() {
            ProductCatalog::with_defaults()
        } else {
            ProductCatalog::new(self.products.clone())
        }
    }

    /// Validate IAP configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_bundle_id.is_empty() {
            return Err(ValidationError::MissingRequired("IAP__DEFAULT_BUNDLE_ID"));
        }
        if self.verify_timeout_secs == 0 || self.verify_timeout_secs > 60 {
            return Err(ValidationError::InvalidVerifyTimeout);
        }
        if self.sweep_interval_secs == 0 {
            return Err(ValidationError::InvalidSweepInterval);
        }
        let degenerate = |e: &CatalogEntry| {
            e.tariff_id <= 0 || matches!(e.duration_days, Some(d) if d <= 0)
        };
        if self.products.values().any(degenerate) {
            return Err(ValidationError::InvalidCatalogEntry);
        }
        Ok(())
    }
}

fn default_verify_timeout() -> u64 {
    10
}

fn default_sweep_interval() -> u64 {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::TariffId;

    fn base_config() -> IapConfig {
        IapConfig {
            apple_shared_secret: "secret".to_string(),
            google_access_token: "token".to_string(),
            default_bundle_id: "com.example.vpn".to_string(),
            verify_timeout_secs: default_verify_timeout(),
            sweep_interval_secs: default_sweep_interval(),
            products: HashMap::new(),
        }
    }

    #[test]
    fn empty_override_falls_back_to_default_catalog() {
        let catalog = base_config().product_catalog();
        assert!(catalog.tariff_for("monthly_sub").is_some());
    }

    #[test]
    fn configured_products_replace_the_default_catalog() {
        let config = IapConfig {
            products: HashMap::from([(
                "promo_week".to_string(),
                CatalogEntry {
                    tariff_id: 7,
                    duration_days: Some(7),
                },
            )]),
            ..base_config()
        };
        let catalog = config.product_catalog();
        assert_eq!(catalog.tariff_for("promo_week"), Some(TariffId::from_i64(7)));
        assert_eq!(catalog.tariff_for("monthly_sub"), None);
    }

    #[test]
    fn missing_bundle_id_fails_validation() {
        let config = IapConfig {
            default_bundle_id: String::new(),
            ..base_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_positive_tariff_id_fails_validation() {
        let config = IapConfig {
            products: HashMap::from([(
                "broken".to_string(),
                CatalogEntry {
                    tariff_id: 0,
                    duration_days: None,
                },
            )]),
            ..base_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidCatalogEntry)
        ));
    }

    #[test]
    fn non_positive_duration_fails_validation() {
        // A zero or negative duration would produce a grant whose end does
        // not lie after its start, and the next sweep would expire it
        // immediately.
        for days in [0, -30] {
            let config = IapConfig {
                products: HashMap::from([(
                    "broken".to_string(),
                    CatalogEntry {
                        tariff_id: 1,
                        duration_days: Some(days),
                    },
                )]),
                ..base_config()
            };
            assert!(matches!(
                config.validate(),
                Err(ValidationError::InvalidCatalogEntry)
            ));
        }
    }

    #[test]
    fn lifetime_entries_pass_validation() {
        let config = IapConfig {
            products: HashMap::from([(
                "lifetime_sub".to_string(),
                CatalogEntry {
                    tariff_id: 3,
                    duration_days: None,
                },
            )]),
            ..base_config()
        };
        assert!(config.validate().is_ok());
    }
}
