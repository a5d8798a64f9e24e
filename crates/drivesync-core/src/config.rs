use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files; useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup; no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default).to_lowercase();
        match raw.as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected a boolean, got {raw:?}"),
            }),
        }
    };

    let inventory_api_base = require("DRIVESYNC_INVENTORY_API_BASE")?;
    let inventory_api_key = require("DRIVESYNC_INVENTORY_API_KEY")?;

    let history_path = PathBuf::from(or_default("DRIVESYNC_HISTORY_PATH", "./order_history.json"));
    let orders_dump_path = PathBuf::from(or_default(
        "DRIVESYNC_ORDERS_DUMP_PATH",
        "./scraped_orders.json",
    ));

    let sync_interval_mins = parse_u64("DRIVESYNC_SYNC_INTERVAL_MINS", "30")?;
    let similarity_threshold = parse_f64("DRIVESYNC_SIMILARITY_THRESHOLD", "90")?;
    let warning_similarity_threshold = parse_f64("DRIVESYNC_WARNING_SIMILARITY_THRESHOLD", "75")?;
    let catalog_cache_ttl_secs = parse_u64("DRIVESYNC_CATALOG_CACHE_TTL_SECS", "600")?;
    let locations_cache_ttl_secs = parse_u64("DRIVESYNC_LOCATIONS_CACHE_TTL_SECS", "3600")?;
    let catalog_cache_capacity = parse_u64("DRIVESYNC_CATALOG_CACHE_CAPACITY", "100")?;
    let locations_cache_capacity = parse_u64("DRIVESYNC_LOCATIONS_CACHE_CAPACITY", "50")?;
    let live_stock_update = parse_bool("DRIVESYNC_LIVE_STOCK_UPDATE", "false")?;
    let request_timeout_secs = parse_u64("DRIVESYNC_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("DRIVESYNC_USER_AGENT", "drivesync/0.1 (order-sync)");
    let log_level = or_default("DRIVESYNC_LOG_LEVEL", "info");

    Ok(AppConfig {
        inventory_api_base,
        inventory_api_key,
        history_path,
        orders_dump_path,
        sync_interval_mins,
        similarity_threshold,
        warning_similarity_threshold,
        catalog_cache_ttl_secs,
        locations_cache_ttl_secs,
        catalog_cache_capacity,
        locations_cache_capacity,
        live_stock_update,
        request_timeout_secs,
        user_agent,
        log_level,
    })
}
