use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Runtime settings for the MCP server and its upstream HTTP client.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Per-request timeout for calls to the retailer endpoints.
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Fallback length, in characters, of a store block when no following
    /// store marker exists in the search-result markup.
    ///
    /// 2000 is a heuristic for "longer than any single store block"; it has
    /// not been validated against the longest block the upstream can emit.
    pub store_block_window: usize,
}
