//! Per-order line-item matching against the inventory catalog.
//!
//! The engine is a pure pass with one side effect: when `live_stock_update`
//! is enabled, each accepted match triggers a single stock-add call routed
//! to the parking location. Every failure mode degrades to "skip this
//! item/order"; nothing here is fatal to the enclosing run.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use drivesync_core::normalize::{clean_price, extract_numeric_value};
use drivesync_core::orders::Order;
use drivesync_match::best_match;

use crate::cache::{LookupCache, CATALOG_KEY, LOCATIONS_KEY};
use crate::client::InventoryClient;
use crate::types::{CatalogProduct, Location};

/// Name every delivered-order stock movement is attributed to. Resolved by
/// similarity so the location can be called "Parking", "Zone de parking",
/// etc. in the inventory system.
const PARKING_QUERY: &str = "Parking";

/// Threshold and cache policy for the engine, constructed once from app
/// configuration and injected; no process-wide config singleton.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Acceptance cutoff in percent; a match exactly at the cutoff is
    /// accepted (inclusive).
    pub similarity_threshold: f64,
    /// Near-miss cutoff in percent; matches in `[warning, acceptance)` are
    /// logged as operator-visible warnings and skipped.
    pub warning_similarity_threshold: f64,
    pub live_stock_update: bool,
    pub catalog_cache_capacity: u64,
    pub catalog_cache_ttl: Duration,
    pub locations_cache_capacity: u64,
    pub locations_cache_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 90.0,
            warning_similarity_threshold: 75.0,
            live_stock_update: false,
            catalog_cache_capacity: 100,
            catalog_cache_ttl: Duration::from_secs(600),
            locations_cache_capacity: 50,
            locations_cache_ttl: Duration::from_secs(3600),
        }
    }
}

/// Result of one accepted line-item match. Ephemeral; reported and logged,
/// never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct MatchOutcome {
    pub product_id: i64,
    pub product_name: String,
    /// Stock level the catalog reported at match time, if any.
    pub stock_amount: Option<f64>,
    pub order_quantity: f64,
    pub unit_price: f64,
    pub similarity_pct: f64,
    pub location_id: i64,
}

pub struct MatchEngine {
    client: InventoryClient,
    config: EngineConfig,
    catalog_cache: LookupCache<CatalogProduct>,
    locations_cache: LookupCache<Location>,
}

impl MatchEngine {
    #[must_use]
    pub fn new(client: InventoryClient, config: EngineConfig) -> Self {
        let catalog_cache = LookupCache::new(
            config.catalog_cache_capacity,
            config.catalog_cache_ttl,
        );
        let locations_cache = LookupCache::new(
            config.locations_cache_capacity,
            config.locations_cache_ttl,
        );
        Self {
            client,
            config,
            catalog_cache,
            locations_cache,
        }
    }

    /// Resolves each of the order's line items against the catalog and
    /// returns the accepted matches keyed by line-item name.
    ///
    /// Returns `None` when the catalog or parking location is unavailable
    /// this pass, and also when nothing matched; the original contract
    /// does not distinguish the two; the logs do.
    pub async fn process(&self, order: &Order) -> Option<BTreeMap<String, MatchOutcome>> {
        tracing::info!(
            order_number = %order.order_number,
            line_items = order.details.len(),
            "matching order line items against inventory"
        );

        let catalog = self.catalog().await?;
        let parking = self.parking_location().await?;

        let mut outcomes = BTreeMap::new();

        for (item_name, item) in &order.details {
            let Some(candidate) = best_match(item_name, &catalog) else {
                tracing::info!(item = %item_name, "no catalog candidates; skipping line item");
                continue;
            };

            if candidate.similarity_pct >= self.config.similarity_threshold {
                let unit_price = convert_unit_price(&item.unit_price);
                let order_quantity = convert_quantity(&item.quantity);

                tracing::info!(
                    item = %item_name,
                    product = %candidate.entity.name,
                    product_id = candidate.entity.id,
                    similarity_pct = format_args!("{:.2}", candidate.similarity_pct),
                    "accepted catalog match"
                );

                if unit_price == 0.0 {
                    // A zero price means the scrape lost the price cell, not
                    // that the item was free; the stock book stays untouched.
                    tracing::warn!(
                        item = %item_name,
                        raw_price = %item.unit_price,
                        "missing or zero unit price; skipping stock update for line item"
                    );
                } else if self.config.live_stock_update {
                    if let Err(e) = self
                        .client
                        .add_stock(candidate.entity.id, order_quantity, parking.0, unit_price)
                        .await
                    {
                        tracing::error!(
                            product_id = candidate.entity.id,
                            error = %e,
                            "failed to add product to stock"
                        );
                    }
                }

                outcomes.insert(
                    item_name.clone(),
                    MatchOutcome {
                        product_id: candidate.entity.id,
                        product_name: candidate.entity.name.clone(),
                        stock_amount: candidate.entity.stock_amount,
                        order_quantity,
                        unit_price,
                        similarity_pct: candidate.similarity_pct,
                        location_id: parking.0,
                    },
                );
            } else if candidate.similarity_pct >= self.config.warning_similarity_threshold {
                tracing::warn!(
                    item = %item_name,
                    nearest = %candidate.entity.name,
                    similarity_pct = format_args!("{:.2}", candidate.similarity_pct),
                    "line item skipped; similarity below acceptance threshold"
                );
            } else {
                tracing::debug!(
                    item = %item_name,
                    similarity_pct = format_args!("{:.2}", candidate.similarity_pct),
                    "line item confidently unmatched"
                );
            }
        }

        if outcomes.is_empty() {
            None
        } else {
            Some(outcomes)
        }
    }

    /// Catalog snapshot via the cache; a live-fetch failure leaves the
    /// cache unpopulated so the next call retries.
    async fn catalog(&self) -> Option<Arc<Vec<CatalogProduct>>> {
        if let Some(snapshot) = self.catalog_cache.get(CATALOG_KEY) {
            tracing::debug!("product catalog served from cache");
            return Some(snapshot);
        }
        match self.client.fetch_catalog().await {
            Ok(products) => Some(self.catalog_cache.insert(CATALOG_KEY, products)),
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch product catalog");
                None
            }
        }
    }

    /// Resolves the parking location id once per `process` call.
    async fn parking_location(&self) -> Option<(i64, String)> {
        let locations = if let Some(snapshot) = self.locations_cache.get(LOCATIONS_KEY) {
            tracing::debug!("locations served from cache");
            snapshot
        } else {
            match self.client.fetch_locations().await {
                Ok(locations) => self.locations_cache.insert(LOCATIONS_KEY, locations),
                Err(e) => {
                    tracing::error!(error = %e, "failed to fetch stock locations");
                    return None;
                }
            }
        };

        let Some(candidate) = best_match(PARKING_QUERY, &locations) else {
            tracing::warn!("no stock locations available; cannot resolve parking location");
            return None;
        };
        if candidate.similarity_pct == 0.0 {
            tracing::warn!(
                nearest = %candidate.entity.name,
                "no location resembling {PARKING_QUERY:?} found"
            );
            return None;
        }

        tracing::debug!(
            location_id = candidate.entity.id,
            location = %candidate.entity.name,
            "resolved parking location"
        );
        Some((candidate.entity.id, candidate.entity.name.clone()))
    }
}

/// Converts a cleaned unit-price string to a numeric amount.
///
/// Empty or unparseable input degrades to `0.0` with a conversion failure
/// logged; callers treat `0.0` as missing data.
fn convert_unit_price(raw: &str) -> f64 {
    let cleaned = clean_price(raw);
    if cleaned.is_empty() {
        return 0.0;
    }
    match Decimal::from_str(&cleaned) {
        Ok(price) => price.to_f64().unwrap_or(0.0),
        Err(e) => {
            tracing::error!(raw, error = %e, "failed to convert unit price");
            0.0
        }
    }
}

/// Best-effort quantity conversion; anything unusable falls back to one
/// unit so an accepted match still books a sane amount.
fn convert_quantity(raw: &str) -> f64 {
    extract_numeric_value(raw)
        .parse::<f64>()
        .ok()
        .filter(|q| *q > 0.0)
        .unwrap_or(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_unit_price_parses_cleaned_decimal() {
        assert!((convert_unit_price("1,09 €") - 1.09).abs() < 1e-9);
        assert!((convert_unit_price("12.50") - 12.5).abs() < 1e-9);
    }

    #[test]
    fn convert_unit_price_empty_is_zero() {
        assert_eq!(convert_unit_price(""), 0.0);
        assert_eq!(convert_unit_price("—"), 0.0);
    }

    #[test]
    fn convert_unit_price_unparseable_is_zero() {
        // Two decimal points survive cleaning but fail decimal parsing.
        assert_eq!(convert_unit_price("2,18 € au lieu de 2,50 €"), 0.0);
    }

    #[test]
    fn convert_quantity_plain_integer() {
        assert!((convert_quantity("2") - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn convert_quantity_falls_back_to_one() {
        assert!((convert_quantity("") - 1.0).abs() < f64::EPSILON);
        assert!((convert_quantity("x") - 1.0).abs() < f64::EPSILON);
        assert!((convert_quantity("0") - 1.0).abs() < f64::EPSILON);
    }
}
