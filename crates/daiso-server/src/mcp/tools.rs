//! Tool registry: definitions advertised by `tools/list` and the handlers
//! behind `tools/call`.

use daiso_core::{PriceInfo, Product, Store, StoreInventory};
use daiso_scraper::{DaisoClient, InventoryQuery, ScraperError, StoreSearch};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Seoul City Hall, used when the caller gives no location.
pub const DEFAULT_LATITUDE: f64 = 37.5665;
pub const DEFAULT_LONGITUDE: f64 = 126.978;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_PAGE_SIZE: u32 = 30;
const DEFAULT_STORE_LIMIT: usize = 50;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid arguments for {tool}: {source}")]
    InvalidArguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("{0}")]
    Validation(&'static str),

    #[error("product not found: {0}")]
    NotFound(String),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] ScraperError),

    #[error("failed to encode tool result: {0}")]
    Encode(#[source] serde_json::Error),
}

impl ToolError {
    /// Whether the caller addressed the tool incorrectly, as opposed to the
    /// tool running and failing.
    #[must_use]
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Self::InvalidArguments { .. } | Self::UnknownTool(_))
    }
}

/// A tool as advertised by `tools/list`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

/// Every tool the server exposes, in a stable order.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "search_products",
            title: "Search products",
            description: "Search the Daiso online catalogue by product name or keyword.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Product name or keyword" },
                    "page": { "type": "integer", "minimum": 1, "default": DEFAULT_PAGE, "description": "Page number" },
                    "pageSize": { "type": "integer", "minimum": 1, "default": DEFAULT_PAGE_SIZE, "description": "Results per page" }
                },
                "required": ["query"]
            }),
        },
        ToolDefinition {
            name: "find_stores",
            title: "Find stores",
            description: "Find Daiso stores by name/address keyword or by region (sido/gugun/dong).",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "keyword": { "type": "string", "description": "Store name or address keyword (e.g. 강남, 홍대)" },
                    "sido": { "type": "string", "description": "Province or metropolitan city (e.g. 서울, 경기)" },
                    "gugun": { "type": "string", "description": "District (e.g. 강남구)" },
                    "dong": { "type": "string", "description": "Neighbourhood (e.g. 역삼동)" },
                    "limit": { "type": "integer", "minimum": 0, "default": DEFAULT_STORE_LIMIT, "description": "Maximum stores to return" }
                }
            }),
        },
        ToolDefinition {
            name: "check_inventory",
            title: "Check inventory",
            description: "Check online stock and per-store stock of a product near a location or matching a store keyword.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "productId": { "type": "string", "description": "Product id from search_products" },
                    "storeQuery": { "type": "string", "description": "Store name or address filter" },
                    "latitude": { "type": "number", "default": DEFAULT_LATITUDE, "description": "Latitude (defaults to Seoul City Hall)" },
                    "longitude": { "type": "number", "default": DEFAULT_LONGITUDE, "description": "Longitude (defaults to Seoul City Hall)" },
                    "page": { "type": "integer", "minimum": 1, "default": DEFAULT_PAGE, "description": "Page number" },
                    "pageSize": { "type": "integer", "minimum": 1, "default": DEFAULT_PAGE_SIZE, "description": "Stores per page" }
                },
                "required": ["productId"]
            }),
        },
        ToolDefinition {
            name: "get_price_info",
            title: "Get price info",
            description: "Look up the current price of a product by id, or by name when no id is given.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "productId": { "type": "string", "description": "Product id" },
                    "productName": { "type": "string", "description": "Product name, used when productId is absent" }
                }
            }),
        },
        ToolDefinition {
            name: "list_districts",
            title: "List districts",
            description: "List the districts (gugun) of a province (sido) for use with find_stores.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "sido": { "type": "string", "description": "Province or metropolitan city (e.g. 서울)" }
                },
                "required": ["sido"]
            }),
        },
        ToolDefinition {
            name: "list_neighborhoods",
            title: "List neighborhoods",
            description: "List the neighbourhoods (dong) of a district for use with find_stores.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "sido": { "type": "string", "description": "Province or metropolitan city (e.g. 서울)" },
                    "gugun": { "type": "string", "description": "District (e.g. 강남구)" }
                },
                "required": ["sido", "gugun"]
            }),
        },
    ]
}

/// Runs the named tool and returns its result as JSON.
///
/// # Errors
///
/// Returns [`ToolError::UnknownTool`] or [`ToolError::InvalidArguments`]
/// when the call itself is malformed, and the other variants when the tool
/// runs and fails.
pub async fn call_tool(
    client: &DaisoClient,
    name: &str,
    arguments: Value,
) -> Result<Value, ToolError> {
    match name {
        "search_products" => encode(&search_products(client, parse_args(name, arguments)?).await?),
        "find_stores" => encode(&find_stores(client, &parse_args(name, arguments)?).await?),
        "check_inventory" => encode(&check_inventory(client, &parse_args(name, arguments)?).await?),
        "get_price_info" => encode(&get_price_info(client, &parse_args(name, arguments)?).await?),
        "list_districts" => encode(&list_districts(client, &parse_args(name, arguments)?).await?),
        "list_neighborhoods" => {
            encode(&list_neighborhoods(client, &parse_args(name, arguments)?).await?)
        }
        other => Err(ToolError::UnknownTool(other.to_string())),
    }
}

/// Absent arguments are treated as an empty object.
fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, ToolError> {
    let arguments = if arguments.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|source| ToolError::InvalidArguments {
        tool: tool.to_string(),
        source,
    })
}

fn encode<T: Serialize>(result: &T) -> Result<Value, ToolError> {
    serde_json::to_value(result).map_err(ToolError::Encode)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_store_limit() -> usize {
    DEFAULT_STORE_LIMIT
}

fn default_latitude() -> f64 {
    DEFAULT_LATITUDE
}

fn default_longitude() -> f64 {
    DEFAULT_LONGITUDE
}

// ---------------------------------------------------------------------------
// search_products
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchProductsArgs {
    #[serde(default)]
    query: String,
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_page_size")]
    page_size: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchProductsResult {
    query: String,
    page: u32,
    page_size: u32,
    total_count: i64,
    count: usize,
    products: Vec<Product>,
}

async fn search_products(
    client: &DaisoClient,
    args: SearchProductsArgs,
) -> Result<SearchProductsResult, ToolError> {
    if args.query.trim().is_empty() {
        return Err(ToolError::Validation("query must not be empty"));
    }

    let page = client
        .search_products(&args.query, args.page, args.page_size)
        .await?;

    Ok(SearchProductsResult {
        query: args.query,
        page: args.page,
        page_size: args.page_size,
        total_count: page.total_count,
        count: page.products.len(),
        products: page.products,
    })
}

// ---------------------------------------------------------------------------
// find_stores
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FindStoresArgs {
    #[serde(default)]
    keyword: Option<String>,
    #[serde(default)]
    sido: Option<String>,
    #[serde(default)]
    gugun: Option<String>,
    #[serde(default)]
    dong: Option<String>,
    #[serde(default = "default_store_limit")]
    limit: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sido: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gugun: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dong: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FindStoresResult {
    search_params: SearchParams,
    total_count: usize,
    count: usize,
    stores: Vec<Store>,
}

async fn find_stores(
    client: &DaisoClient,
    args: &FindStoresArgs,
) -> Result<FindStoresResult, ToolError> {
    let search = StoreSearch {
        keyword: non_blank(args.keyword.as_deref()).map(str::to_string),
        sido: non_blank(args.sido.as_deref()).map(str::to_string),
        gugun: non_blank(args.gugun.as_deref()).map(str::to_string),
        dong: non_blank(args.dong.as_deref()).map(str::to_string),
    };
    if search.keyword.is_none() && search.sido.is_none() {
        return Err(ToolError::Validation("either keyword or sido is required"));
    }

    let mut stores = client.fetch_stores(&search).await?;
    let total_count = stores.len();
    stores.truncate(args.limit);

    Ok(FindStoresResult {
        search_params: SearchParams {
            keyword: search.keyword,
            sido: search.sido,
            gugun: search.gugun,
            dong: search.dong,
        },
        total_count,
        count: stores.len(),
        stores,
    })
}

// ---------------------------------------------------------------------------
// check_inventory
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CheckInventoryArgs {
    #[serde(default)]
    product_id: String,
    #[serde(default)]
    store_query: String,
    #[serde(default = "default_latitude")]
    latitude: f64,
    #[serde(default = "default_longitude")]
    longitude: f64,
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_page_size")]
    page_size: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct Location {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoreInventorySummary {
    total_stores: i64,
    in_stock_count: usize,
    out_of_stock_count: usize,
    page: u32,
    page_size: u32,
    stores: Vec<StoreInventory>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CheckInventoryResult {
    product_id: String,
    location: Location,
    online_stock: i64,
    store_inventory: StoreInventorySummary,
}

async fn check_inventory(
    client: &DaisoClient,
    args: &CheckInventoryArgs,
) -> Result<CheckInventoryResult, ToolError> {
    let product_id = args.product_id.trim();
    if product_id.is_empty() {
        return Err(ToolError::Validation("productId must not be empty"));
    }

    let query = InventoryQuery {
        product_no: product_id.to_string(),
        keyword: args.store_query.trim().to_string(),
        latitude: args.latitude,
        longitude: args.longitude,
        page: args.page,
        page_size: args.page_size,
    };
    let (online_stock, inventory) = tokio::try_join!(
        client.fetch_online_stock(product_id),
        client.fetch_store_inventory(&query)
    )?;

    let in_stock_count = inventory.stores.iter().filter(|s| s.in_stock()).count();
    let out_of_stock_count = inventory.stores.iter().filter(|s| s.quantity == 0).count();

    Ok(CheckInventoryResult {
        product_id: query.product_no,
        location: Location {
            latitude: args.latitude,
            longitude: args.longitude,
        },
        online_stock,
        store_inventory: StoreInventorySummary {
            total_stores: inventory.total_count,
            in_stock_count,
            out_of_stock_count,
            page: args.page,
            page_size: args.page_size,
            stores: inventory.stores,
        },
    })
}

// ---------------------------------------------------------------------------
// get_price_info
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GetPriceInfoArgs {
    #[serde(default)]
    product_id: Option<String>,
    #[serde(default)]
    product_name: Option<String>,
}

async fn get_price_info(
    client: &DaisoClient,
    args: &GetPriceInfoArgs,
) -> Result<PriceInfo, ToolError> {
    let (lookup, info) = if let Some(id) = non_blank(args.product_id.as_deref()) {
        (id, client.price_info_by_id(id).await?)
    } else if let Some(name) = non_blank(args.product_name.as_deref()) {
        (name, client.price_info_by_name(name).await?)
    } else {
        return Err(ToolError::Validation(
            "either productId or productName is required",
        ));
    };

    info.ok_or_else(|| ToolError::NotFound(lookup.to_string()))
}

// ---------------------------------------------------------------------------
// list_districts / list_neighborhoods
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct ListDistrictsArgs {
    #[serde(default)]
    sido: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ListDistrictsResult {
    sido: String,
    count: usize,
    districts: Vec<String>,
}

async fn list_districts(
    client: &DaisoClient,
    args: &ListDistrictsArgs,
) -> Result<ListDistrictsResult, ToolError> {
    let sido = args.sido.trim();
    if sido.is_empty() {
        return Err(ToolError::Validation("sido must not be empty"));
    }

    let districts = client.fetch_districts(sido).await?;
    Ok(ListDistrictsResult {
        sido: sido.to_string(),
        count: districts.len(),
        districts,
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListNeighborhoodsArgs {
    #[serde(default)]
    sido: String,
    #[serde(default)]
    gugun: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ListNeighborhoodsResult {
    sido: String,
    gugun: String,
    count: usize,
    neighborhoods: Vec<String>,
}

async fn list_neighborhoods(
    client: &DaisoClient,
    args: &ListNeighborhoodsArgs,
) -> Result<ListNeighborhoodsResult, ToolError> {
    let (sido, gugun) = (args.sido.trim(), args.gugun.trim());
    if sido.is_empty() || gugun.is_empty() {
        return Err(ToolError::Validation("sido and gugun must not be empty"));
    }

    let neighborhoods = client.fetch_neighborhoods(sido, gugun).await?;
    Ok(ListNeighborhoodsResult {
        sido: sido.to_string(),
        gugun: gugun.to_string(),
        count: neighborhoods.len(),
        neighborhoods,
    })
}

#[cfg(test)]
#[path = "tools_test.rs"]
mod tests;
