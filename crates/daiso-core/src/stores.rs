//! Store and per-store inventory records returned by the store tools.

use serde::{Deserialize, Serialize};

/// Facility flags published for a store on the store-search page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct StoreOptions {
    pub parking: bool,
    /// Step-free entrance ramp.
    pub ramp: bool,
    pub elevator: bool,
    pub cashless: bool,
    pub photo_sticker: bool,
    pub name_sticker: bool,
    pub sim_card: bool,
    pub tax_free: bool,
    pub group_order: bool,
    /// Online order pickup.
    pub pickup: bool,
}

/// A store extracted from the store-search markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub name: String,
    /// Empty when the listing has no phone number.
    pub phone: String,
    /// Empty when the listing has no address line.
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    /// `HH:MM` when the upstream code was four digits, otherwise verbatim.
    pub open_time: String,
    pub close_time: String,
    pub options: StoreOptions,
}

/// Facility flags carried by the inventory API. A subset of [`StoreOptions`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct InventoryOptions {
    pub parking: bool,
    pub sim_card: bool,
    pub pickup: bool,
    pub tax_free: bool,
    pub elevator: bool,
    pub ramp: bool,
    pub cashless: bool,
}

/// Stock level of one product at one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreInventory {
    pub store_code: String,
    pub store_name: String,
    pub address: String,
    pub phone: String,
    pub open_time: String,
    pub close_time: String,
    pub lat: f64,
    pub lng: f64,
    /// Distance from the query point as formatted by the upstream, e.g. `"0.4"`.
    pub distance: String,
    pub quantity: i64,
    pub options: InventoryOptions,
}

impl StoreInventory {
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}
