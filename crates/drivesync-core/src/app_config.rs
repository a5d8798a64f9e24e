use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    /// Base URL of the Grocy-compatible inventory API.
    pub inventory_api_base: String,
    /// API key sent as the `GROCY-API-KEY` header.
    pub inventory_api_key: String,
    pub history_path: PathBuf,
    pub orders_dump_path: PathBuf,
    pub sync_interval_mins: u64,
    /// Acceptance cutoff for name matches, in percent (inclusive).
    pub similarity_threshold: f64,
    /// Near-miss cutoff below the acceptance threshold; matches in between
    /// are logged as operator-visible warnings.
    pub warning_similarity_threshold: f64,
    pub catalog_cache_ttl_secs: u64,
    pub locations_cache_ttl_secs: u64,
    pub catalog_cache_capacity: u64,
    pub locations_cache_capacity: u64,
    /// When false (the default), accepted matches are recorded but no
    /// stock-add call is made.
    pub live_stock_update: bool,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub log_level: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("inventory_api_base", &self.inventory_api_base)
            .field("inventory_api_key", &"[redacted]")
            .field("history_path", &self.history_path)
            .field("orders_dump_path", &self.orders_dump_path)
            .field("sync_interval_mins", &self.sync_interval_mins)
            .field("similarity_threshold", &self.similarity_threshold)
            .field(
                "warning_similarity_threshold",
                &self.warning_similarity_threshold,
            )
            .field("catalog_cache_ttl_secs", &self.catalog_cache_ttl_secs)
            .field("locations_cache_ttl_secs", &self.locations_cache_ttl_secs)
            .field("catalog_cache_capacity", &self.catalog_cache_capacity)
            .field("locations_cache_capacity", &self.locations_cache_capacity)
            .field("live_stock_update", &self.live_stock_update)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("log_level", &self.log_level)
            .finish()
    }
}
