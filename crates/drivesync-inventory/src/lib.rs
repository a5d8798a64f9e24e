//! Inventory-side integration for drivesync.
//!
//! Talks to a Grocy-compatible REST API for the product catalog, stock
//! locations, and stock-add calls; fronts the two read endpoints with
//! TTL-bounded caches; and hosts the match engine that resolves an order's
//! line items against the catalog.

pub mod cache;
pub mod client;
pub mod engine;
pub mod error;
pub mod types;

pub use cache::{LookupCache, CATALOG_KEY, LOCATIONS_KEY};
pub use client::InventoryClient;
pub use engine::{EngineConfig, MatchEngine, MatchOutcome};
pub use error::InventoryError;
pub use types::{CatalogProduct, Location};
