//! Inventory API response types.
//!
//! These are externally owned records; the engine treats them as read-only,
//! cached, TTL-bounded snapshots. Only the fields the matcher and the stock
//! path need are modeled; the API returns many more, which serde ignores.

use drivesync_match::Named;
use serde::Deserialize;

/// A product from `GET /api/objects/products`.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogProduct {
    pub id: i64,
    pub name: String,
    /// Current stock level, when the API exposes it on the product object.
    #[serde(default)]
    pub stock_amount: Option<f64>,
}

/// A stock location from `GET /api/objects/locations`.
#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
}

impl Named for CatalogProduct {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Location {
    fn name(&self) -> &str {
        &self.name
    }
}
