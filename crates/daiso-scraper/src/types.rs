//! Vendor response types for the online mall and store-search endpoints.
//!
//! ## Observed shapes
//!
//! ### Product search (`FindStoreGoods`)
//! Documents use upper-snake keys (`PD_NO`, `PDNM`, `PD_PRC`, …). `PD_PRC` is
//! usually a decimal string such as `"2000"` but numeric values have been
//! seen, so it is accepted as either. `resultSet.result` is an array whose
//! first element carries the page; an empty or absent array means no hits.
//!
//! ### Store inventory (`newIntSelStr`)
//! Coordinates (`strLttd`, `strLitd`) are JSON numbers; `qty` and `km` are
//! strings. Both are read leniently since the API is undocumented. Facility flags are `"Y"` / `"N"` and several are omitted for older
//! stores.
//!
//! ### Online stock (`selOnlStck`)
//! `data` may be `null` when `success` is false. `stck` is normally a
//! number but is read leniently, as is `intStrCont` on the inventory page.

use serde::{Deserialize, Deserializer};

/// Top-level response from the product search endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSearchResponse {
    #[serde(default)]
    pub result_set: Option<ResultSet>,
}

impl ProductSearchResponse {
    /// The first result page, if the response carried one with documents.
    #[must_use]
    pub fn first_page(&self) -> Option<&SearchResult> {
        self.result_set
            .as_ref()?
            .result
            .first()
            .filter(|page| page.result_documents.is_some())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ResultSet {
    #[serde(default)]
    pub result: Vec<SearchResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(default)]
    pub total_size: Option<i64>,
    #[serde(default)]
    pub result_documents: Option<Vec<ProductDocument>>,
}

/// A single product document from the search index.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ProductDocument {
    #[serde(default, deserialize_with = "string_or_number")]
    pub pd_no: String,
    #[serde(default)]
    pub pdnm: Option<String>,
    /// Display name used when `PDNM` is blank.
    #[serde(default)]
    pub exh_pd_nm: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub pd_prc: String,
    /// Image path relative to the image CDN root.
    #[serde(default)]
    pub atch_file_url: Option<String>,
    #[serde(default)]
    pub brnd_nm: Option<String>,
    #[serde(default)]
    pub sold_out_yn: Option<String>,
    #[serde(default)]
    pub new_pd_yn: Option<String>,
    #[serde(default)]
    pub pkup_or_psbl_yn: Option<String>,
}

/// Response from the online stock endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct OnlineStockResponse {
    #[serde(default)]
    pub data: Option<OnlineStock>,
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineStock {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub stck: Option<i64>,
}

/// Response from the per-store inventory endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct StoreInventoryResponse {
    #[serde(default)]
    pub data: Option<StoreInventoryPage>,
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreInventoryPage {
    #[serde(default, rename = "msStrVOList")]
    pub ms_str_vo_list: Option<Vec<StoreInventoryRecord>>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub int_str_cont: Option<i64>,
}

/// One store row from the inventory endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreInventoryRecord {
    #[serde(default, deserialize_with = "string_or_number")]
    pub str_cd: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub str_nm: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub str_addr: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub str_tno: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub opng_time: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub clsng_time: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub str_lttd: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub str_litd: Option<f64>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub km: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub qty: String,
    #[serde(default)]
    pub park_yn: Option<String>,
    #[serde(default)]
    pub usim_yn: Option<String>,
    #[serde(default)]
    pub pkup_yn: Option<String>,
    #[serde(default)]
    pub taxf_yn: Option<String>,
    #[serde(default)]
    pub elvt_yn: Option<String>,
    #[serde(default)]
    pub entr_ramp_yn: Option<String>,
    #[serde(default)]
    pub nocash_yn: Option<String>,
}

/// One entry of the district / neighbourhood lookups.
#[derive(Debug, Clone, Deserialize)]
pub struct RegionOption {
    pub value: String,
}

/// Accepts a JSON string, number, or null and yields its text form.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// Accepts a JSON number or a numeric string.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Accepts a JSON integer or an integer string.
fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_document_accepts_numeric_price_and_id() {
        let doc: ProductDocument = serde_json::from_value(serde_json::json!({
            "PD_NO": 1_034_604,
            "PDNM": "수납함",
            "PD_PRC": 2000
        }))
        .expect("deserialize");
        assert_eq!(doc.pd_no, "1034604");
        assert_eq!(doc.pd_prc, "2000");
        assert_eq!(doc.pdnm.as_deref(), Some("수납함"));
        assert!(doc.atch_file_url.is_none());
    }

    #[test]
    fn first_page_is_none_without_documents() {
        let resp: ProductSearchResponse =
            serde_json::from_value(serde_json::json!({"resultSet": {"result": [{"totalSize": 0}]}}))
                .expect("deserialize");
        assert!(resp.first_page().is_none());

        let empty: ProductSearchResponse =
            serde_json::from_value(serde_json::json!({})).expect("deserialize");
        assert!(empty.first_page().is_none());
    }

    #[test]
    fn inventory_record_tolerates_missing_flags_and_null_qty() {
        let record: StoreInventoryRecord = serde_json::from_value(serde_json::json!({
            "strCd": "10224",
            "strNm": "강남역2호점",
            "strLttd": 37.4979,
            "strLitd": "127.0276",
            "strTno": null,
            "km": "0.3",
            "qty": null
        }))
        .expect("deserialize");
        assert_eq!(record.qty, "");
        assert!(record.elvt_yn.is_none());
        assert_eq!(record.str_lttd, Some(37.4979));
        assert_eq!(record.str_litd, Some(127.0276));
        assert_eq!(record.str_tno, "");
    }

    #[test]
    fn online_stock_accepts_string_count_and_ignores_product_number() {
        let resp: OnlineStockResponse = serde_json::from_value(serde_json::json!({
            "success": true,
            "data": {"pdNo": 1_034_604, "stck": "5"}
        }))
        .expect("deserialize");
        assert_eq!(resp.data.and_then(|d| d.stck), Some(5));
    }

    #[test]
    fn inventory_page_accepts_string_total() {
        let page: StoreInventoryPage =
            serde_json::from_value(serde_json::json!({"intStrCont": "42", "msStrVOList": []}))
                .expect("deserialize");
        assert_eq!(page.int_str_cont, Some(42));
    }
}
