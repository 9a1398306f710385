pub mod client;
pub mod error;
pub mod normalize;
pub mod stores;
pub mod types;

pub use client::{
    DaisoClient, DaisoEndpoints, InventoryPage, InventoryQuery, ProductPage, StoreSearch,
};
pub use error::ScraperError;
pub use stores::{format_time_code, BlockOutcome, SkipReason, StoreMarkupExtractor};
