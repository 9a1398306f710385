use super::*;
use daiso_scraper::DaisoEndpoints;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(base: &str) -> DaisoClient {
    DaisoClient::with_endpoints(5, "daiso-test/0.1", &DaisoEndpoints::single_host(base))
        .expect("build test client")
}

/// Client pointed at a port nothing listens on; any upstream call fails.
fn offline_client() -> DaisoClient {
    client_for("http://127.0.0.1:9")
}

fn store_div(name: &str, lat: &str) -> String {
    format!(
        r#"<div class="bx-store" data-start="1000" data-end="2200" data-lat="{lat}" data-lng="127.0"><h4 class="place">{name}</h4></div>"#
    )
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[test]
fn tool_definitions_list_every_tool_once() {
    let names: Vec<&str> = tool_definitions().iter().map(|t| t.name).collect();
    assert_eq!(
        names,
        vec![
            "search_products",
            "find_stores",
            "check_inventory",
            "get_price_info",
            "list_districts",
            "list_neighborhoods",
        ]
    );
}

#[test]
fn tool_definitions_serialize_input_schema_in_camel_case() {
    let defs = serde_json::to_value(tool_definitions()).expect("serialize");
    let first = &defs[0];
    assert_eq!(first["inputSchema"]["type"], "object");
    assert_eq!(first["inputSchema"]["required"], json!(["query"]));
    assert_eq!(
        first["inputSchema"]["properties"]["pageSize"]["default"],
        json!(30)
    );
}

#[tokio::test]
async fn unknown_tool_is_a_protocol_error() {
    let err = call_tool(&offline_client(), "delete_everything", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::UnknownTool(ref name) if name == "delete_everything"));
    assert!(err.is_protocol_error());
}

#[tokio::test]
async fn mistyped_arguments_are_a_protocol_error() {
    let err = call_tool(
        &offline_client(),
        "search_products",
        json!({"query": "수납함", "page": "two"}),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ToolError::InvalidArguments { ref tool, .. } if tool == "search_products"));
    assert!(err.is_protocol_error());
}

// ---------------------------------------------------------------------------
// Validation (no upstream call is made)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_products_rejects_blank_query() {
    let err = call_tool(&offline_client(), "search_products", json!({"query": "  "}))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::Validation(_)));
    assert!(!err.is_protocol_error());
}

#[tokio::test]
async fn find_stores_requires_keyword_or_sido() {
    let err = call_tool(&offline_client(), "find_stores", json!({"gugun": "강남구"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::Validation(_)));
}

#[tokio::test]
async fn check_inventory_requires_product_id() {
    let err = call_tool(&offline_client(), "check_inventory", Value::Null)
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::Validation(_)));
}

#[tokio::test]
async fn get_price_info_requires_id_or_name() {
    let err = call_tool(
        &offline_client(),
        "get_price_info",
        json!({"productId": "", "productName": " "}),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ToolError::Validation(_)));
}

#[tokio::test]
async fn list_neighborhoods_requires_both_regions() {
    let err = call_tool(&offline_client(), "list_neighborhoods", json!({"sido": "서울"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::Validation(_)));
}

#[tokio::test]
async fn upstream_failure_is_reported_as_tool_failure() {
    let err = call_tool(&offline_client(), "list_districts", json!({"sido": "서울"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::Upstream(_)));
    assert!(!err.is_protocol_error());
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_products_applies_paging_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ssn/search/FindStoreGoods"))
        .and(query_param("pageNum", "1"))
        .and(query_param("cntPerPage", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resultSet": {"result": [{
                "totalSize": 120,
                "resultDocuments": [{"PD_NO": "1034604", "PDNM": "수납함", "PD_PRC": "2000"}]
            }]}
        })))
        .mount(&server)
        .await;

    let result = call_tool(&client_for(&server.uri()), "search_products", json!({"query": "수납함"}))
        .await
        .expect("tool should succeed");

    assert_eq!(result["query"], "수납함");
    assert_eq!(result["page"], 1);
    assert_eq!(result["pageSize"], 30);
    assert_eq!(result["totalCount"], 120);
    assert_eq!(result["count"], 1);
    assert_eq!(result["products"][0]["price"], 2000);
}

#[tokio::test]
async fn find_stores_truncates_to_limit_and_reports_total() {
    let server = MockServer::start().await;
    let html = format!(
        "{}{}{}",
        store_div("강남역점", "37.49"),
        store_div("역삼점", "37.50"),
        store_div("선릉점", "37.51")
    );
    Mock::given(method("GET"))
        .and(path("/cs/ajax/shop_search"))
        .and(query_param("name_address", "강남"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&server)
        .await;

    let result = call_tool(
        &client_for(&server.uri()),
        "find_stores",
        json!({"keyword": "강남", "limit": 2}),
    )
    .await
    .expect("tool should succeed");

    assert_eq!(result["searchParams"], json!({"keyword": "강남"}));
    assert_eq!(result["totalCount"], 3);
    assert_eq!(result["count"], 2);
    assert_eq!(result["stores"][1]["name"], "역삼점");
    assert_eq!(result["stores"][0]["openTime"], "10:00");
}

#[tokio::test]
async fn check_inventory_counts_in_and_out_of_stock_stores() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ms/msg/selOnlStck"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": {"stck": 5}})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ms/msg/newIntSelStr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "intStrCont": 0,
                "msStrVOList": [
                    {"strCd": "1", "strNm": "A", "qty": "3"},
                    {"strCd": "2", "strNm": "B", "qty": "0"},
                    {"strCd": "3", "strNm": "C", "qty": "품절"}
                ]
            }
        })))
        .mount(&server)
        .await;

    let result = call_tool(
        &client_for(&server.uri()),
        "check_inventory",
        json!({"productId": "1034604"}),
    )
    .await
    .expect("tool should succeed");

    assert_eq!(result["productId"], "1034604");
    assert_eq!(result["location"], json!({"latitude": 37.5665, "longitude": 126.978}));
    assert_eq!(result["onlineStock"], 5);
    let inventory = &result["storeInventory"];
    assert_eq!(inventory["totalStores"], 3);
    assert_eq!(inventory["inStockCount"], 1);
    assert_eq!(inventory["outOfStockCount"], 2);
    assert_eq!(inventory["page"], 1);
    assert_eq!(inventory["pageSize"], 30);
    assert_eq!(inventory["stores"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn get_price_info_reports_missing_product() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ssn/search/FindStoreGoods"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resultSet": {"result": []}})))
        .mount(&server)
        .await;

    let err = call_tool(
        &client_for(&server.uri()),
        "get_price_info",
        json!({"productName": "없는상품"}),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ToolError::NotFound(ref q) if q == "없는상품"));
    assert_eq!(err.to_string(), "product not found: 없는상품");
}

#[tokio::test]
async fn list_neighborhoods_wraps_values_with_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cs/ajax/gugun_search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"value": "역삼동"}, {"value": "삼성동"}])),
        )
        .mount(&server)
        .await;

    let result = call_tool(
        &client_for(&server.uri()),
        "list_neighborhoods",
        json!({"sido": "서울", "gugun": "강남구"}),
    )
    .await
    .expect("tool should succeed");
    assert_eq!(
        result,
        json!({
            "sido": "서울",
            "gugun": "강남구",
            "count": 2,
            "neighborhoods": ["역삼동", "삼성동"]
        })
    );
}
