use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod extract;
pub mod normalize;
pub mod orders;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use extract::{extract_details, extract_order, extract_orders, ExtractError};
pub use extract::{RawDetailRow, RawOrderRow};
pub use orders::{LineItem, Order, ProcessingStatus, STATUS_CANCELLED, STATUS_DELIVERED};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
