//! HTTP transport for the processor's JSON API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use core_kernel::DomainPort;

use crate::credentials::{ApiScope, MerchantCredentials};
use crate::error::RemoteProcessorError;
use crate::ports::RemoteGateway;
use crate::types::{
    AddCardRequest, AdjustmentRequest, CardList, CardRecord, CreateProfileRequest, ErrorBody,
    PaymentRequest, PaymentResponse, ProfileResponse,
};

/// Production processor endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://api.na.bambora.com/v1";

/// Processor client over reqwest
#[derive(Debug, Clone)]
pub struct BamboraGateway {
    credentials: MerchantCredentials,
    base_url: Url,
    client: Client,
}

impl BamboraGateway {
    /// Creates a client against `base_url` with a per-request `timeout`
    pub fn new(
        credentials: MerchantCredentials,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, RemoteProcessorError> {
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| RemoteProcessorError::Config(format!("invalid base url {}: {}", base_url, e)))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteProcessorError::Config(e.to_string()))?;

        Ok(Self {
            credentials,
            base_url,
            client,
        })
    }

    pub fn merchant_id(&self) -> &str {
        self.credentials.merchant_id()
    }

    fn request(
        &self,
        method: Method,
        scope: ApiScope,
        path: &str,
    ) -> Result<RequestBuilder, RemoteProcessorError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| RemoteProcessorError::Config(format!("invalid path {}: {}", path, e)))?;

        debug!(method = %method, path, ?scope, "Sending processor request");

        Ok(self
            .client
            .request(method, url)
            .header("Authorization", self.credentials.authorization_header(scope))
            .header("Accept", "application/json"))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, RemoteProcessorError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let error = match serde_json::from_str::<ErrorBody>(&body) {
                Ok(error) => RemoteProcessorError::Rejected {
                    code: error.code,
                    category: error.category,
                    message: error.message,
                    http_status: status.as_u16(),
                },
                Err(_) => RemoteProcessorError::Rejected {
                    code: 0,
                    category: 0,
                    message: format!("HTTP {}", status.as_u16()),
                    http_status: status.as_u16(),
                },
            };
            warn!(
                status = status.as_u16(),
                code = ?error.code(),
                message = %error.message(),
                "Processor rejected request"
            );
            return Err(error);
        }

        serde_json::from_str(&body).map_err(|e| RemoteProcessorError::Decode(e.to_string()))
    }
}

impl DomainPort for BamboraGateway {}

#[async_trait]
impl RemoteGateway for BamboraGateway {
    async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentResponse, RemoteProcessorError> {
        let builder = self.request(Method::POST, ApiScope::Payments, "payments")?.json(request);
        self.send(builder).await
    }

    async fn complete_payment(
        &self,
        transaction_id: &str,
        request: &AdjustmentRequest,
    ) -> Result<PaymentResponse, RemoteProcessorError> {
        let path = format!("payments/{}/completions", transaction_id);
        let builder = self.request(Method::POST, ApiScope::Payments, &path)?.json(request);
        self.send(builder).await
    }

    async fn void_payment(
        &self,
        transaction_id: &str,
        request: &AdjustmentRequest,
    ) -> Result<PaymentResponse, RemoteProcessorError> {
        let path = format!("payments/{}/void", transaction_id);
        let builder = self.request(Method::POST, ApiScope::Payments, &path)?.json(request);
        self.send(builder).await
    }

    async fn return_payment(
        &self,
        transaction_id: &str,
        request: &AdjustmentRequest,
    ) -> Result<PaymentResponse, RemoteProcessorError> {
        let path = format!("payments/{}/returns", transaction_id);
        let builder = self.request(Method::POST, ApiScope::Payments, &path)?.json(request);
        self.send(builder).await
    }

    async fn create_profile(
        &self,
        request: &CreateProfileRequest,
    ) -> Result<ProfileResponse, RemoteProcessorError> {
        let builder = self.request(Method::POST, ApiScope::Profiles, "profiles")?.json(request);
        self.send(builder).await
    }

    async fn add_card(
        &self,
        profile_id: &str,
        request: &AddCardRequest,
    ) -> Result<ProfileResponse, RemoteProcessorError> {
        let path = format!("profiles/{}/cards", profile_id);
        let builder = self.request(Method::POST, ApiScope::Profiles, &path)?.json(request);
        self.send(builder).await
    }

    async fn get_cards(&self, profile_id: &str) -> Result<Vec<CardRecord>, RemoteProcessorError> {
        let path = format!("profiles/{}/cards", profile_id);
        let builder = self.request(Method::GET, ApiScope::Profiles, &path)?;
        let list: CardList = self.send(builder).await?;
        Ok(list.card)
    }

    async fn delete_card(
        &self,
        profile_id: &str,
        card_id: &str,
    ) -> Result<ProfileResponse, RemoteProcessorError> {
        let path = format!("profiles/{}/cards/{}", profile_id, card_id);
        let builder = self.request(Method::DELETE, ApiScope::Profiles, &path)?;
        self.send(builder).await
    }
}
