//! Where scraped order rows come from.
//!
//! The browser automation job runs out of process and leaves a JSON dump
//! behind; [`DumpFileSource`] reads it. The [`OrderSource`] seam exists so
//! the sync pass can be driven by an in-memory source in tests, and by a
//! live scraper later without touching the pass itself.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use drivesync_core::extract::{RawDetailRow, RawOrderRow};
use drivesync_core::orders::Order;

#[derive(Debug, Error)]
pub(crate) enum SourceError {
    #[error("failed to read scrape dump {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("scrape dump {path} is not a valid dump document: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no detail rows captured for order {order_number}")]
    MissingDetail { order_number: String },
}

/// The document the scraping job writes: the order-history table rows plus
/// the detail-table rows it managed to capture, keyed by order number.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ScrapeDump {
    #[serde(default)]
    pub orders: Vec<RawOrderRow>,
    #[serde(default)]
    pub details: HashMap<String, Vec<RawDetailRow>>,
}

pub(crate) trait OrderSource {
    async fn fetch_order_rows(&self) -> Result<Vec<RawOrderRow>, SourceError>;

    /// Detail rows for one order. A missing capture is a per-order soft
    /// failure; the caller skips the order and the pass continues.
    async fn fetch_order_detail(&self, order: &Order) -> Result<Vec<RawDetailRow>, SourceError>;
}

/// [`OrderSource`] backed by a scrape dump loaded once from disk.
#[derive(Debug)]
pub(crate) struct DumpFileSource {
    dump: ScrapeDump,
}

impl DumpFileSource {
    pub(crate) fn load(path: &Path) -> Result<Self, SourceError> {
        let raw = std::fs::read_to_string(path).map_err(|e| SourceError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let dump: ScrapeDump = serde_json::from_str(&raw).map_err(|e| SourceError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::debug!(
            path = %path.display(),
            orders = dump.orders.len(),
            details = dump.details.len(),
            "scrape dump loaded"
        );
        Ok(Self { dump })
    }
}

impl OrderSource for DumpFileSource {
    async fn fetch_order_rows(&self) -> Result<Vec<RawOrderRow>, SourceError> {
        Ok(self.dump.orders.clone())
    }

    async fn fetch_order_detail(&self, order: &Order) -> Result<Vec<RawDetailRow>, SourceError> {
        self.dump
            .details
            .get(&order.order_number)
            .cloned()
            .ok_or_else(|| SourceError::MissingDetail {
                order_number: order.order_number.clone(),
            })
    }
}
