pub mod api;
pub mod mcp;
pub mod middleware;

pub use api::{build_app, AppState};
