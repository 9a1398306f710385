pub mod app_config;
pub mod config;
pub mod products;
pub mod stores;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{PriceInfo, Product};
pub use stores::{InventoryOptions, Store, StoreInventory, StoreOptions};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
