//! Online-mall endpoints: product search, online stock and per-store stock.

use daiso_core::{PriceInfo, Product, StoreInventory};
use serde::Serialize;

use super::endpoints::join;
use super::DaisoClient;
use crate::error::ScraperError;
use crate::normalize::{normalize_price_info, normalize_product, normalize_store_inventory};
use crate::types::{
    OnlineStockResponse, ProductDocument, ProductSearchResponse, StoreInventoryResponse,
};

const PRODUCT_SEARCH_PATH: &str = "ssn/search/FindStoreGoods";
const ONLINE_STOCK_PATH: &str = "ms/msg/selOnlStck";
const STORE_STOCK_PATH: &str = "ms/msg/newIntSelStr";

/// Page size used when looking a product up by its number; the exact match
/// is not always ranked first.
const ID_LOOKUP_PAGE_SIZE: u32 = 10;

/// One page of product search results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Total hits across all pages, as reported by the search index.
    pub total_count: i64,
}

/// Parameters of a per-store stock lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryQuery {
    pub product_no: String,
    /// Store name or address filter; empty means "nearest stores".
    pub keyword: String,
    pub latitude: f64,
    pub longitude: f64,
    pub page: u32,
    pub page_size: u32,
}

/// One page of per-store stock.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryPage {
    pub stores: Vec<StoreInventory>,
    pub total_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OnlineStockRequest<'a> {
    pd_no: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StoreStockRequest<'a> {
    keyword: &'a str,
    pd_no: &'a str,
    cur_lttd: f64,
    cur_litd: f64,
    geolocation_agr_yn: &'static str,
    pkup_yn: &'static str,
    int_cd: &'static str,
    page_size: u32,
    current_page: u32,
}

impl DaisoClient {
    /// Searches the online mall catalogue.
    ///
    /// A response without result documents is treated as zero hits.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::UnexpectedStatus`] on a non-2xx response.
    /// - [`ScraperError::Http`] on network failure.
    /// - [`ScraperError::Deserialize`] if the body is not the expected JSON.
    pub async fn search_products(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<ProductPage, ScraperError> {
        let response = self.search_documents(query, page, page_size).await?;
        let Some(first) = response.first_page() else {
            return Ok(ProductPage::default());
        };

        let products = first
            .result_documents
            .iter()
            .flatten()
            .map(|doc| normalize_product(doc, &self.endpoints.image_base))
            .collect();

        Ok(ProductPage {
            products,
            total_count: first.total_size.unwrap_or(0),
        })
    }

    /// Looks up price information by product number.
    ///
    /// Prefers the document whose number matches exactly and otherwise falls
    /// back to the top hit. Returns `Ok(None)` when the search has no hits.
    ///
    /// # Errors
    ///
    /// Same as [`DaisoClient::search_products`].
    pub async fn price_info_by_id(
        &self,
        product_id: &str,
    ) -> Result<Option<PriceInfo>, ScraperError> {
        let response = self
            .search_documents(product_id, 1, ID_LOOKUP_PAGE_SIZE)
            .await?;
        let docs = first_page_documents(&response);

        let doc = docs
            .iter()
            .find(|doc| doc.pd_no == product_id)
            .or_else(|| docs.first());

        Ok(doc.map(|doc| normalize_price_info(doc, &self.endpoints.image_base)))
    }

    /// Looks up price information for the top hit of a name search.
    ///
    /// # Errors
    ///
    /// Same as [`DaisoClient::search_products`].
    pub async fn price_info_by_name(
        &self,
        product_name: &str,
    ) -> Result<Option<PriceInfo>, ScraperError> {
        let response = self.search_documents(product_name, 1, 1).await?;
        Ok(first_page_documents(&response)
            .first()
            .map(|doc| normalize_price_info(doc, &self.endpoints.image_base)))
    }

    /// Units of `product_no` available for online order.
    ///
    /// Returns 0 when the API reports `success: false` or omits the count.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::UnexpectedStatus`] on a non-2xx response.
    /// - [`ScraperError::Http`] on network failure.
    /// - [`ScraperError::Deserialize`] if the body is not the expected JSON.
    pub async fn fetch_online_stock(&self, product_no: &str) -> Result<i64, ScraperError> {
        let url = join(&self.endpoints.mall_api, ONLINE_STOCK_PATH)?;
        let request = self
            .client
            .post(url.clone())
            .json(&OnlineStockRequest { pd_no: product_no });

        let response: OnlineStockResponse =
            Self::send_for_json(request, &url, &format!("online stock(pdNo={product_no})"))
                .await?;

        if !response.success {
            tracing::debug!(product_no, "online stock lookup reported failure");
            return Ok(0);
        }
        Ok(response.data.and_then(|d| d.stck).unwrap_or(0))
    }

    /// Per-store stock of a product around a location.
    ///
    /// An unsuccessful response or a missing store list yields an empty page.
    /// The total falls back to the number of returned stores when the API
    /// reports zero.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::UnexpectedStatus`] on a non-2xx response.
    /// - [`ScraperError::Http`] on network failure.
    /// - [`ScraperError::Deserialize`] if the body is not the expected JSON.
    pub async fn fetch_store_inventory(
        &self,
        query: &InventoryQuery,
    ) -> Result<InventoryPage, ScraperError> {
        let url = join(&self.endpoints.mall_api, STORE_STOCK_PATH)?;
        let body = StoreStockRequest {
            keyword: &query.keyword,
            pd_no: &query.product_no,
            cur_lttd: query.latitude,
            cur_litd: query.longitude,
            geolocation_agr_yn: "Y",
            pkup_yn: "",
            int_cd: "",
            page_size: query.page_size,
            current_page: query.page,
        };
        let request = self.client.post(url.clone()).json(&body);

        let response: StoreInventoryResponse = Self::send_for_json(
            request,
            &url,
            &format!("store inventory(pdNo={})", query.product_no),
        )
        .await?;

        if !response.success {
            return Ok(InventoryPage::default());
        }
        let Some(page) = response.data else {
            return Ok(InventoryPage::default());
        };
        let Some(records) = page.ms_str_vo_list else {
            return Ok(InventoryPage::default());
        };

        let stores: Vec<StoreInventory> = records
            .into_iter()
            .map(normalize_store_inventory)
            .collect();
        let total_count = match page.int_str_cont {
            Some(total) if total != 0 => total,
            _ => i64::try_from(stores.len()).unwrap_or(i64::MAX),
        };

        Ok(InventoryPage {
            stores,
            total_count,
        })
    }

    async fn search_documents(
        &self,
        term: &str,
        page: u32,
        page_size: u32,
    ) -> Result<ProductSearchResponse, ScraperError> {
        let url = join(&self.endpoints.search, PRODUCT_SEARCH_PATH)?;
        let request = self.client.get(url.clone()).query(&[
            ("searchTerm", term.to_string()),
            ("cntPerPage", page_size.to_string()),
            ("pageNum", page.to_string()),
        ]);

        Self::send_for_json(request, &url, &format!("product search(searchTerm={term})")).await
    }
}

fn first_page_documents(response: &ProductSearchResponse) -> &[ProductDocument] {
    response
        .first_page()
        .and_then(|page| page.result_documents.as_deref())
        .unwrap_or_default()
}
