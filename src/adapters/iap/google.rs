//! Google Play purchase token validator.
//!
//! Looks a purchase token up through the Android Publisher API
//! (`purchases.products.get`) and normalizes the result. Google receipts
//! carry only the token, so the webhook must name the product id.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::foundation::Timestamp;
use crate::ports::{NormalizedReceipt, ReceiptError, ReceiptValidationRequest, ReceiptValidator};

const ANDROID_PUBLISHER_URL: &str = "https://androidpublisher.googleapis.com/androidpublisher/v3";

/// purchaseState value meaning the purchase went through.
const PURCHASE_STATE_PURCHASED: i64 = 0;

/// Android Publisher API configuration.
#[derive(Clone)]
pub struct GoogleIapConfig {
    /// OAuth2 access token for the service account.
    access_token: SecretString,

    /// API base URL.
    api_base_url: String,
}

impl GoogleIapConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
            api_base_url: ANDROID_PUBLISHER_URL.to_string(),
        }
    }

    /// Override the API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Google Play implementation of the ReceiptValidator port.
pub struct GoogleReceiptValidator {
    config: GoogleIapConfig,
    http_client: reqwest::Client,
}

impl GoogleReceiptValidator {
    pub fn new(config: GoogleIapConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }
}

#[async_trait]
impl ReceiptValidator for GoogleReceiptValidator {
    async fn validate(
        &self,
        request: ReceiptValidationRequest,
    ) -> Result<NormalizedReceipt, ReceiptError> {
        let product_id = request
            .product_id
            .as_deref()
            .ok_or_else(|| ReceiptError::malformed("google receipts require a product id"))?;

        let url = format!(
            "{}/applications/{}/purchases/products/{}/tokens/{}",
            self.config.api_base_url, request.app_id, product_id, request.receipt
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(self.config.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| ReceiptError::unavailable(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::BAD_REQUEST {
            return Err(ReceiptError::rejected(format!(
                "purchase token lookup returned HTTP {}",
                status
            )));
        }
        if !status.is_success() {
            return Err(ReceiptError::unavailable(format!(
                "purchases.products.get returned HTTP {}",
                status
            )));
        }

        let purchase: ProductPurchase = response.json().await.map_err(|e| {
            ReceiptError::unavailable(format!("malformed purchases.products body: {}", e))
        })?;

        if purchase.purchase_state != Some(PURCHASE_STATE_PURCHASED) {
            return Err(ReceiptError::rejected(format!(
                "purchaseState {:?}",
                purchase.purchase_state
            )));
        }

        let transaction_id = purchase
            .order_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ReceiptError::rejected("purchase has no order id"))?;

        Ok(NormalizedReceipt {
            transaction_id,
            product_id: product_id.to_string(),
            purchase_date: purchase
                .purchase_time_millis
                .and_then(|v| v.parse::<i64>().ok())
                .and_then(Timestamp::from_unix_millis),
            // purchases.products covers one-time and managed products only;
            // no expiry is reported.
            expiry_date: None,
        })
    }
}

/// Subset of the `ProductPurchase` resource.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductPurchase {
    order_id: Option<String>,
    purchase_state: Option<i64>,
    purchase_time_millis: Option<String>,
}
