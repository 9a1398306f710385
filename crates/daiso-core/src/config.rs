use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8787";

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const DEFAULT_STORE_BLOCK_WINDOW: usize = 2000;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to a value that cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to a value that cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it from a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let bind_addr = or_default("DAISO_BIND_ADDR", DEFAULT_BIND_ADDR)
        .parse::<SocketAddr>()
        .map_err(|e| invalid("DAISO_BIND_ADDR", e.to_string()))?;

    let request_timeout_secs = or_default("DAISO_REQUEST_TIMEOUT_SECS", "10")
        .parse::<u64>()
        .map_err(|e| invalid("DAISO_REQUEST_TIMEOUT_SECS", e.to_string()))?;
    if request_timeout_secs == 0 {
        return Err(invalid(
            "DAISO_REQUEST_TIMEOUT_SECS",
            "timeout must be at least 1 second".to_string(),
        ));
    }

    let store_block_window = or_default(
        "DAISO_STORE_BLOCK_WINDOW",
        &DEFAULT_STORE_BLOCK_WINDOW.to_string(),
    )
    .parse::<usize>()
    .map_err(|e| invalid("DAISO_STORE_BLOCK_WINDOW", e.to_string()))?;

    let env = parse_environment(&or_default("DAISO_ENV", "development"))?;
    let log_level = or_default("DAISO_LOG_LEVEL", "info");
    let user_agent = or_default("DAISO_USER_AGENT", DEFAULT_USER_AGENT);

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        request_timeout_secs,
        user_agent,
        store_block_window,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "DAISO_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
