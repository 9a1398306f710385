//! Corporate-site endpoints: offline store search and region lookups.

use daiso_core::Store;

use super::endpoints::join;
use super::DaisoClient;
use crate::error::ScraperError;
use crate::types::RegionOption;

const STORE_SEARCH_PATH: &str = "cs/ajax/shop_search";
const DISTRICTS_PATH: &str = "cs/ajax/sido_search";
const NEIGHBORHOODS_PATH: &str = "cs/ajax/gugun_search";

/// Filters for the offline store search. Absent filters are sent as empty
/// strings, which the site treats as "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSearch {
    /// Matched against store name and address.
    pub keyword: Option<String>,
    pub sido: Option<String>,
    pub gugun: Option<String>,
    pub dong: Option<String>,
}

impl StoreSearch {
    #[must_use]
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            ..Self::default()
        }
    }

    fn query_pairs(&self) -> [(&'static str, &str); 4] {
        [
            ("name_address", self.keyword.as_deref().unwrap_or_default()),
            ("sido", self.sido.as_deref().unwrap_or_default()),
            ("gugun", self.gugun.as_deref().unwrap_or_default()),
            ("dong", self.dong.as_deref().unwrap_or_default()),
        ]
    }
}

impl DaisoClient {
    /// Fetches the store-search HTML fragment and extracts every store in it.
    ///
    /// Blocks the extractor cannot read are dropped, so the result may be
    /// shorter than the number of stores the page shows.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::UnexpectedStatus`] on a non-2xx response.
    /// - [`ScraperError::Http`] on network failure.
    pub async fn fetch_stores(&self, search: &StoreSearch) -> Result<Vec<Store>, ScraperError> {
        let url = join(&self.endpoints.shop, STORE_SEARCH_PATH)?;
        let request = self.client.get(url.clone()).query(&search.query_pairs());

        let html = Self::send_for_text(request, &url).await?;
        let stores = self.extractor.extract(&html);
        tracing::debug!(
            count = stores.len(),
            html_len = html.len(),
            "extracted stores from search page"
        );
        Ok(stores)
    }

    /// Lists the districts (`gugun`) of a province (`sido`).
    ///
    /// # Errors
    ///
    /// - [`ScraperError::UnexpectedStatus`] on a non-2xx response.
    /// - [`ScraperError::Http`] on network failure.
    /// - [`ScraperError::Deserialize`] if the body is not a JSON array of
    ///   `{"value": ...}` objects.
    pub async fn fetch_districts(&self, sido: &str) -> Result<Vec<String>, ScraperError> {
        let url = join(&self.endpoints.shop, DISTRICTS_PATH)?;
        let request = self.client.get(url.clone()).query(&[("sido", sido)]);

        let options: Vec<RegionOption> =
            Self::send_for_json(request, &url, &format!("districts(sido={sido})")).await?;
        Ok(options.into_iter().map(|o| o.value).collect())
    }

    /// Lists the neighbourhoods (`dong`) of a district.
    ///
    /// # Errors
    ///
    /// Same as [`DaisoClient::fetch_districts`].
    pub async fn fetch_neighborhoods(
        &self,
        sido: &str,
        gugun: &str,
    ) -> Result<Vec<String>, ScraperError> {
        let url = join(&self.endpoints.shop, NEIGHBORHOODS_PATH)?;
        let request = self
            .client
            .get(url.clone())
            .query(&[("sido", sido), ("gugun", gugun)]);

        let options: Vec<RegionOption> = Self::send_for_json(
            request,
            &url,
            &format!("neighborhoods(sido={sido}, gugun={gugun})"),
        )
        .await?;
        Ok(options.into_iter().map(|o| o.value).collect())
    }
}
