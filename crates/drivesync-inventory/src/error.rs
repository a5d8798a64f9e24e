use thiserror::Error;

/// Errors from the inventory API boundary.
///
/// Any variant means "the inventory system is unavailable this pass" to the
/// engine; never an empty result. The engine logs and skips; it does not
/// retry (scheduling the next pass is the run loop's job).
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid inventory API base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
