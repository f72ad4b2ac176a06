//! Provider-dispatching receipt validator.
//!
//! The reconciler holds one `dyn ReceiptValidator`; this implementation
//! routes each request to the Apple or Google validator by provider tag.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::payment::PaymentProvider;
use crate::ports::{NormalizedReceipt, ReceiptError, ReceiptValidationRequest, ReceiptValidator};

/// Routes validation requests to the matching storefront validator.
pub struct ProviderDispatchValidator {
    apple: Arc<dyn ReceiptValidator>,
    google: Arc<dyn ReceiptValidator>,
}

impl ProviderDispatchValidator {
    pub fn new(apple: Arc<dyn ReceiptValidator>, google: Arc<dyn ReceiptValidator>) -> Self {
        Self { apple, google }
    }
}

#[async_trait]
impl ReceiptValidator for ProviderDispatchValidator {
    async fn validate(
        &self,
        request: ReceiptValidationRequest,
    ) -> Result<NormalizedReceipt, ReceiptError> {
        match request.provider {
            PaymentProvider::Apple => self.apple.validate(request).await,
            PaymentProvider::Google => self.google.validate(request).await,
            PaymentProvider::Manual => {
                Err(ReceiptError::malformed("manual payments carry no receipt"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;

    struct TaggedValidator {
        tag: &'static str,
    }

    #[async_trait]
    impl ReceiptValidator for TaggedValidator {
        async fn validate(
            &self,
            _request: ReceiptValidationRequest,
        ) -> Result<NormalizedReceipt, ReceiptError> {
            Ok(NormalizedReceipt {
                transaction_id: self.tag.to_string(),
                product_id: "monthly_sub".to_string(),
                purchase_date: Timestamp::from_unix_millis(0),
                expiry_date: None,
            })
        }
    }

    fn dispatcher() -> ProviderDispatchValidator {
        ProviderDispatchValidator::new(
            Arc::new(TaggedValidator { tag: "apple" }),
            Arc::new(TaggedValidator { tag: "google" }),
        )
    }

    fn request_for(provider: PaymentProvider) -> ReceiptValidationRequest {
        ReceiptValidationRequest {
            provider,
            receipt: "blob".to_string(),
            app_id: "com.example.vpn".to_string(),
            product_id: Some("monthly_sub".to_string()),
        }
    }

    #[tokio::test]
    async fn routes_by_provider_tag() {
        let d = dispatcher();

        let apple = d.validate(request_for(PaymentProvider::Apple)).await.unwrap();
        assert_eq!(apple.transaction_id, "apple");

        let google = d
            .validate(request_for(PaymentProvider::Google))
            .await
            .unwrap();
        assert_eq!(google.transaction_id, "google");
    }

    #[tokio::test]
    async fn manual_provider_has_no_validator() {
        let d = dispatcher();
        let err = d
            .validate(request_for(PaymentProvider::Manual))
            .await
            .unwrap_err();
        assert!(matches!(err, ReceiptError::Malformed(_)));
    }
}
