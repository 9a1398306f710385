use serde::{Deserialize, Serialize};

/// A catalogue entry from the online mall search, normalized for tool output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Mall product number (`PD_NO`), e.g. `"1034604"`.
    pub id: String,
    pub name: String,
    /// Price in KRW.
    pub price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub sold_out: bool,
    pub is_new: bool,
    /// Whether the product can be reserved online and picked up in store.
    pub pickup_available: bool,
}

/// Current price of a single product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceInfo {
    pub product_id: String,
    pub product_name: String,
    pub current_price: i64,
    /// ISO 4217 code; the mall only sells in `"KRW"`.
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub sold_out: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_serializes_camel_case_and_omits_missing_optionals() {
        let product = Product {
            id: "1034604".to_string(),
            name: "Storage box".to_string(),
            price: 2000,
            image_url: None,
            brand: None,
            sold_out: false,
            is_new: true,
            pickup_available: true,
        };

        let value = serde_json::to_value(&product).expect("serialize");
        assert_eq!(value["pickupAvailable"], true);
        assert_eq!(value["isNew"], true);
        assert!(value.get("imageUrl").is_none());
        assert!(value.get("brand").is_none());
    }
}
