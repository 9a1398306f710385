//! HTTP client for the retailer's public store-search and online-mall APIs.

mod endpoints;
mod mall;
mod shop;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use crate::error::ScraperError;
use crate::stores::StoreMarkupExtractor;

pub use endpoints::{
    DaisoEndpoints, DEFAULT_IMAGE_BASE, DEFAULT_MALL_API_BASE, DEFAULT_SEARCH_BASE,
    DEFAULT_SHOP_BASE,
};
pub use mall::{InventoryPage, InventoryQuery, ProductPage};
pub use shop::StoreSearch;

use endpoints::ResolvedEndpoints;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const ACCEPT_ANY: &str = "application/json, text/html, */*";
const ACCEPT_LANGUAGE_KO: &str = "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7";

/// Client for the retailer's store-search site and online-mall APIs.
///
/// Every request carries a browser-like `User-Agent`, a Korean
/// `Accept-Language`, and the configured timeout. Non-2xx responses surface
/// as [`ScraperError::UnexpectedStatus`]; there is no retry.
///
/// Cloning is cheap: the underlying `reqwest::Client` is reference-counted.
#[derive(Debug, Clone)]
pub struct DaisoClient {
    client: Client,
    endpoints: ResolvedEndpoints,
    extractor: StoreMarkupExtractor,
}

impl DaisoClient {
    /// Creates a client pointed at the production hosts.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        Self::with_endpoints(timeout_secs, user_agent, &DaisoEndpoints::default())
    }

    /// Creates a client with custom base URLs (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ScraperError::InvalidBaseUrl`] if any base
    /// URL does not parse.
    pub fn with_endpoints(
        timeout_secs: u64,
        user_agent: &str,
        endpoints: &DaisoEndpoints,
    ) -> Result<Self, ScraperError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_ANY));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_KO));

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoints: ResolvedEndpoints::resolve(endpoints)?,
            extractor: StoreMarkupExtractor::default(),
        })
    }

    /// Replaces the store-markup extractor (e.g. to change its fallback window).
    #[must_use]
    pub fn with_store_extractor(mut self, extractor: StoreMarkupExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    #[must_use]
    pub fn store_extractor(&self) -> &StoreMarkupExtractor {
        &self.extractor
    }

    /// Sends `request` and returns the body if the status is 2xx.
    async fn send_for_text(request: RequestBuilder, url: &Url) -> Result<String, ScraperError> {
        tracing::debug!(url = %url, "calling upstream");
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }

    /// Sends `request` and deserializes a 2xx JSON body as `T`.
    async fn send_for_json<T: DeserializeOwned>(
        request: RequestBuilder,
        url: &Url,
        context: &str,
    ) -> Result<T, ScraperError> {
        let body = Self::send_for_text(request, url).await?;
        serde_json::from_str::<T>(&body).map_err(|e| ScraperError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}
