//! Normalization from vendor response shapes to [`daiso_core`] records.

use daiso_core::{InventoryOptions, PriceInfo, Product, StoreInventory};

use crate::types::{ProductDocument, StoreInventoryRecord};

/// The mall only sells in Korean won.
pub const CURRENCY: &str = "KRW";

/// Parses the leading run of decimal digits (with optional sign) as an
/// integer, returning 0 when there is none.
///
/// The vendor formats counts and prices loosely (`"2000"`, `"12개"`,
/// `" 3"`), so this reads as much of a number as is present rather than
/// rejecting the whole field.
#[must_use]
pub fn parse_leading_int(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    let value = digits[..end].parse::<i64>().unwrap_or(0);
    if negative {
        -value
    } else {
        value
    }
}

/// Joins a CDN-relative image path onto `image_base`. Blank paths yield `None`.
#[must_use]
pub fn image_url(image_base: &str, path: Option<&str>) -> Option<String> {
    let path = path.map(str::trim).filter(|p| !p.is_empty())?;
    Some(format!("{}{path}", image_base.trim_end_matches('/')))
}

fn is_yes(flag: Option<&str>) -> bool {
    flag == Some("Y")
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Display name: `PDNM`, falling back to `EXH_PD_NM`.
fn product_name(doc: &ProductDocument) -> String {
    non_blank(doc.pdnm.as_deref())
        .or_else(|| non_blank(doc.exh_pd_nm.as_deref()))
        .unwrap_or_default()
        .to_string()
}

/// Normalizes a search document into a [`Product`].
#[must_use]
pub fn normalize_product(doc: &ProductDocument, image_base: &str) -> Product {
    Product {
        id: doc.pd_no.clone(),
        name: product_name(doc),
        price: parse_leading_int(&doc.pd_prc),
        image_url: image_url(image_base, doc.atch_file_url.as_deref()),
        brand: non_blank(doc.brnd_nm.as_deref()).map(str::to_string),
        sold_out: is_yes(doc.sold_out_yn.as_deref()),
        is_new: is_yes(doc.new_pd_yn.as_deref()),
        pickup_available: is_yes(doc.pkup_or_psbl_yn.as_deref()),
    }
}

/// Normalizes a search document into a [`PriceInfo`].
#[must_use]
pub fn normalize_price_info(doc: &ProductDocument, image_base: &str) -> PriceInfo {
    PriceInfo {
        product_id: doc.pd_no.clone(),
        product_name: product_name(doc),
        current_price: parse_leading_int(&doc.pd_prc),
        currency: CURRENCY.to_string(),
        image_url: image_url(image_base, doc.atch_file_url.as_deref()),
        brand: non_blank(doc.brnd_nm.as_deref()).map(str::to_string),
        sold_out: is_yes(doc.sold_out_yn.as_deref()),
    }
}

/// Normalizes an inventory row into a [`StoreInventory`].
#[must_use]
pub fn normalize_store_inventory(record: StoreInventoryRecord) -> StoreInventory {
    let quantity = parse_leading_int(&record.qty);
    StoreInventory {
        store_code: record.str_cd,
        store_name: record.str_nm,
        address: record.str_addr,
        phone: record.str_tno,
        open_time: record.opng_time,
        close_time: record.clsng_time,
        lat: record.str_lttd.unwrap_or_default(),
        lng: record.str_litd.unwrap_or_default(),
        distance: record.km,
        quantity,
        options: InventoryOptions {
            parking: is_yes(record.park_yn.as_deref()),
            sim_card: is_yes(record.usim_yn.as_deref()),
            pickup: is_yes(record.pkup_yn.as_deref()),
            tax_free: is_yes(record.taxf_yn.as_deref()),
            elevator: is_yes(record.elvt_yn.as_deref()),
            ramp: is_yes(record.entr_ramp_yn.as_deref()),
            cashless: is_yes(record.nocash_yn.as_deref()),
        },
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
