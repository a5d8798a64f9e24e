//! HTTP client for the Grocy-compatible inventory REST API.
//!
//! Authentication is a static `GROCY-API-KEY` header. Non-2xx responses and
//! transport failures surface as typed [`InventoryError`] values; there is
//! deliberately no retry/backoff here; a failed call means "unavailable
//! this pass" and the next scheduled pass retries naturally.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::InventoryError;
use crate::types::{CatalogProduct, Location};

const API_KEY_HEADER: &str = "GROCY-API-KEY";

pub struct InventoryClient {
    client: Client,
    base_url: reqwest::Url,
    api_key: String,
}

impl InventoryClient {
    /// Creates an `InventoryClient` with configured timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::InvalidBaseUrl`] if `base_url` does not
    /// parse as an absolute URL, and [`InventoryError::Http`] if the
    /// underlying `reqwest::Client` cannot be constructed.
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, InventoryError> {
        // Normalize to a trailing slash so Url::join keeps the full path.
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url =
            reqwest::Url::parse(&normalized).map_err(|e| InventoryError::InvalidBaseUrl {
                base_url: normalized.clone(),
                reason: e.to_string(),
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_owned(),
        })
    }

    /// Fetches the full product catalog.
    ///
    /// # Errors
    ///
    /// - [`InventoryError::UnexpectedStatus`]: any non-2xx response.
    /// - [`InventoryError::Http`]: network or TLS failure.
    /// - [`InventoryError::Deserialize`]: response body is not the
    ///   expected JSON shape.
    pub async fn fetch_catalog(&self) -> Result<Vec<CatalogProduct>, InventoryError> {
        self.get_objects("products").await
    }

    /// Fetches all stock locations.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Self::fetch_catalog`].
    pub async fn fetch_locations(&self) -> Result<Vec<Location>, InventoryError> {
        self.get_objects("locations").await
    }

    /// Adds `amount` units of a product to stock at a location, with the
    /// purchase price attached.
    ///
    /// # Errors
    ///
    /// - [`InventoryError::UnexpectedStatus`]: any non-2xx response.
    /// - [`InventoryError::Http`]: network or TLS failure.
    pub async fn add_stock(
        &self,
        product_id: i64,
        amount: f64,
        location_id: i64,
        price: f64,
    ) -> Result<(), InventoryError> {
        let url = self.endpoint(&format!("api/stock/products/{product_id}/add"))?;
        let payload = serde_json::json!({
            "amount": amount,
            "location_id": location_id,
            "price": price,
        });

        tracing::info!(
            product_id,
            amount,
            location_id,
            price,
            "adding product to stock"
        );

        let response = self
            .client
            .post(url.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(InventoryError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(())
    }

    async fn get_objects<T: DeserializeOwned>(
        &self,
        collection: &str,
    ) -> Result<Vec<T>, InventoryError> {
        let url = self.endpoint(&format!("api/objects/{collection}"))?;

        let response = self
            .client
            .get(url.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(InventoryError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<Vec<T>>(&body).map_err(|e| InventoryError::Deserialize {
            context: format!("{collection} from {url}"),
            source: e,
        })
    }

    fn endpoint(&self, path: &str) -> Result<reqwest::Url, InventoryError> {
        self.base_url
            .join(path)
            .map_err(|e| InventoryError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }
}
