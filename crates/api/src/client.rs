//! HTTP client for the 0x swap API.

use crate::network::EvmNetwork;
use crate::request::{build_request_url, AffiliateParams, SwapEndpoint, SwapQuoteRequest};
use crate::response::{validate_price, validate_quote, ZrxPrice, ZrxQuote};
use crate::{ValidationError, ZrxApiError};
use alloy::primitives::Address;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Header carrying the API key for gated endpoints.
const API_KEY_HEADER: &str = "0x-api-key";

/// Transport that fetches a JSON document.
///
/// Implement this to route requests through something other than reqwest
/// (a proxy, a recorded fixture, a test double).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JsonTransport: Send + Sync {
    async fn get_json(&self, url: Url, headers: Vec<(String, String)>) -> Result<serde_json::Value>;
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl JsonTransport for HttpTransport {
    async fn get_json(&self, url: Url, headers: Vec<(String, String)>) -> Result<serde_json::Value> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("0x API error: {} - {}", status, body);
        }

        Ok(response.json().await?)
    }
}

/// API key and affiliate settings shared by every request.
#[derive(Debug, Clone, Default)]
pub struct ApiCredentials {
    /// Key for gated endpoints; blank keys are ignored
    pub api_key: Option<String>,
    /// Affiliate/fee parameters
    pub affiliate: Option<AffiliateParams>,
}

impl ApiCredentials {
    fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Whether requests go to the gated host.
    pub fn is_gated(&self) -> bool {
        self.api_key().is_some()
    }
}

/// 0x swap API client.
#[derive(Clone)]
pub struct ZrxClient {
    transport: Arc<dyn JsonTransport>,
    credentials: ApiCredentials,
}

impl std::fmt::Debug for ZrxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZrxClient")
            .field("gated", &self.credentials.is_gated())
            .field("affiliate", &self.credentials.affiliate)
            .finish_non_exhaustive()
    }
}

impl ZrxClient {
    /// Create a client over reqwest.
    pub fn new(credentials: ApiCredentials, timeout: Duration) -> Result<Self> {
        Ok(Self::with_transport(credentials, Arc::new(HttpTransport::new(timeout)?)))
    }

    /// Create a client over a custom transport.
    pub fn with_transport(credentials: ApiCredentials, transport: Arc<dyn JsonTransport>) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    pub fn credentials(&self) -> &ApiCredentials {
        &self.credentials
    }

    /// Build a request URL with this client's credentials applied.
    pub fn request_url(
        &self,
        endpoint: SwapEndpoint,
        request: &SwapQuoteRequest,
        network: &EvmNetwork,
        extra_params: &[(&str, String)],
    ) -> Result<Url, ZrxApiError> {
        build_request_url(
            endpoint,
            request,
            network,
            self.credentials.is_gated(),
            self.credentials.affiliate.as_ref(),
            extra_params,
        )
    }

    fn headers(&self) -> Vec<(String, String)> {
        self.credentials
            .api_key()
            .map(|key| vec![(API_KEY_HEADER.to_string(), key.to_string())])
            .unwrap_or_default()
    }

    async fn get(&self, url: Url) -> Result<serde_json::Value, ZrxApiError> {
        debug!(url = %url, "Requesting 0x API");
        self.transport
            .get_json(url, self.headers())
            .await
            .map_err(ZrxApiError::Transport)
    }

    /// Fetch an indicative price for `taker`.
    ///
    /// The outer error covers URL construction and transport; the inner one
    /// is a schema mismatch the caller may choose to tolerate.
    #[instrument(skip(self, request), fields(chain_id = network.chain_id))]
    pub async fn fetch_price(
        &self,
        request: &SwapQuoteRequest,
        network: &EvmNetwork,
        taker: Address,
    ) -> Result<Result<ZrxPrice, ValidationError>, ZrxApiError> {
        let url = self.request_url(
            SwapEndpoint::Price,
            request,
            network,
            &[("takerAddress", taker.to_string())],
        )?;
        let body = self.get(url).await?;
        Ok(validate_price(body))
    }

    /// Fetch a firm, fillable quote for `taker`.
    #[instrument(skip(self, request), fields(chain_id = network.chain_id))]
    pub async fn fetch_quote(
        &self,
        request: &SwapQuoteRequest,
        network: &EvmNetwork,
        taker: Address,
    ) -> Result<Result<ZrxQuote, ValidationError>, ZrxApiError> {
        let url = self.request_url(
            SwapEndpoint::Quote,
            request,
            network,
            &[
                ("intentOnFilling", "true".to_string()),
                ("takerAddress", taker.to_string()),
            ],
        )?;
        let body = self.get(url).await?;
        Ok(validate_quote(body))
    }
}
