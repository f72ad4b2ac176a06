//! Apple App Store receipt validator.
//!
//! Talks to the `verifyReceipt` endpoint and normalizes the response. The
//! production URL is tried first; a 21007 status (sandbox receipt sent to
//! production) triggers one retry against the sandbox URL, so TestFlight
//! purchases keep working without a separate deployment.
//!
//! # Security
//!
//! - The shared secret is held via `secrecy::SecretString` and never logged
//! - The receipt's bundle id must match the expected app id

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use crate::domain::foundation::Timestamp;
use crate::ports::{NormalizedReceipt, ReceiptError, ReceiptValidationRequest, ReceiptValidator};

const PRODUCTION_VERIFY_URL: &str = "https://buy.itunes.apple.com/verifyReceipt";
const SANDBOX_VERIFY_URL: &str = "https://sandbox.itunes.apple.com/verifyReceipt";

/// Status code Apple returns for a sandbox receipt sent to production.
const STATUS_SANDBOX_RECEIPT: i64 = 21007;

/// Apple verifyReceipt configuration.
#[derive(Clone)]
pub struct AppleIapConfig {
    /// App-specific shared secret for auto-renewable subscriptions.
    shared_secret: SecretString,

    /// Production verification endpoint.
    verify_url: String,

    /// Sandbox verification endpoint, used on status 21007.
    sandbox_verify_url: String,
}

impl AppleIapConfig {
    pub fn new(shared_secret: impl Into<String>) -> Self {
        Self {
            shared_secret: SecretString::new(shared_secret.into()),
            verify_url: PRODUCTION_VERIFY_URL.to_string(),
            sandbox_verify_url: SANDBOX_VERIFY_URL.to_string(),
        }
    }

    /// Override both endpoints (for testing).
    pub fn with_urls(mut self, verify: impl Into<String>, sandbox: impl Into<String>) -> Self {
        self.verify_url = verify.into();
        self.sandbox_verify_url = sandbox.into();
        self
    }
}

/// Apple App Store implementation of the ReceiptValidator port.
pub struct AppleReceiptValidator {
    config: AppleIapConfig,
    http_client: reqwest::Client,
}

impl AppleReceiptValidator {
    pub fn new(config: AppleIapConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    async fn verify_at(&self, url: &str, receipt: &str) -> Result<VerifyReceiptResponse, ReceiptError> {
        let body = json!({
            "receipt-data": receipt,
            "password": self.config.shared_secret.expose_secret(),
            "exclude-old-transactions": true,
        });

        let response = self
            .http_client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ReceiptError::unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ReceiptError::unavailable(format!(
                "verifyReceipt returned HTTP {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ReceiptError::unavailable(format!("malformed verifyReceipt body: {}", e)))
    }
}

#[async_trait]
impl ReceiptValidator for AppleReceiptValidator {
    async fn validate(
        &self,
        request: ReceiptValidationRequest,
    ) -> Result<NormalizedReceipt, ReceiptError> {
        let mut response = self
            .verify_at(&self.config.verify_url, &request.receipt)
            .await?;

        if response.status == STATUS_SANDBOX_RECEIPT {
            tracing::debug!("sandbox receipt sent to production endpoint, retrying sandbox");
            response = self
                .verify_at(&self.config.sandbox_verify_url, &request.receipt)
                .await?;
        }

        classify_status(response.status)?;

        let receipt_info = response
            .receipt
            .as_ref()
            .ok_or_else(|| ReceiptError::rejected("verifyReceipt returned no receipt object"))?;

        if receipt_info.bundle_id != request.app_id {
            return Err(ReceiptError::rejected(format!(
                "bundle id mismatch: {}",
                receipt_info.bundle_id
            )));
        }

        // Auto-renewable subscriptions report the current period in
        // latest_receipt_info; one-time products only appear in in_app.
        let transaction = response
            .latest_receipt_info
            .as_deref()
            .and_then(|txns| txns.last())
            .or_else(|| receipt_info.in_app.as_deref().and_then(|txns| txns.last()))
            .ok_or_else(|| ReceiptError::rejected("receipt contains no transactions"))?;

        Ok(NormalizedReceipt {
            transaction_id: transaction.transaction_id.clone(),
            product_id: transaction.product_id.clone(),
            purchase_date: parse_millis(transaction.purchase_date_ms.as_deref()),
            expiry_date: parse_millis(transaction.expires_date_ms.as_deref()),
        })
    }
}

/// Maps a verifyReceipt status code to a failure class.
///
/// Status reference: 0 success, 21000-21004 request/receipt problems,
/// 21005/21009 transient Apple-side failures, 21006 expired, 21010 account
/// not found.
fn classify_status(status: i64) -> Result<(), ReceiptError> {
    match status {
        0 => Ok(()),
        21000 | 21002 => Err(ReceiptError::malformed(format!(
            "verifyReceipt status {}",
            status
        ))),
        21005 | 21009 => Err(ReceiptError::unavailable(format!(
            "verifyReceipt status {}",
            status
        ))),
        other => Err(ReceiptError::rejected(format!(
            "verifyReceipt status {}",
            other
        ))),
    }
}

fn parse_millis(value: Option<&str>) -> Option<Timestamp> {
    value
        .and_then(|v| v.parse::<i64>().ok())
        .and_then(Timestamp::from_unix_millis)
}

#[derive(Debug, Deserialize)]
struct VerifyReceiptResponse {
    status: i64,
    receipt: Option<AppleReceiptInfo>,
    latest_receipt_info: Option<Vec<AppleTransaction>>,
}

#[derive(Debug, Deserialize)]
struct AppleReceiptInfo {
    bundle_id: String,
    in_app: Option<Vec<AppleTransaction>>,
}

#[derive(Debug, Deserialize)]
struct AppleTransaction {
    transaction_id: String,
    product_id: String,
    purchase_date_ms: Option<String>,
    expires_date_ms: Option<String>,
}
