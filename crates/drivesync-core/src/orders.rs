//! Domain types for scraped drive-portal orders.
//!
//! ## Observed shape from the portal's order-history table
//!
//! Every cell arrives as display text: prices carry currency symbols and
//! non-breaking spaces, dates come in the portal's locale format, and the
//! status label is a French phrase (`"En cours de préparation"`, `"Livré"`,
//! `"Annulé"`, ...). Extraction normalizes all of that before an [`Order`]
//! is constructed, so the fields here hold cleaned values: prices are bare
//! decimal strings, dates are ISO `YYYY-MM-DD` (or the invalid-date
//! sentinel), and `status` is lowercase.
//!
//! Orders are persisted indefinitely in the history document and mutated in
//! place on later reconciliation passes; they are never deleted. The
//! `order_number` is the sole identity key across passes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Lowercase terminal status meaning the order was delivered.
pub const STATUS_DELIVERED: &str = "livré";

/// Lowercase terminal status meaning the order was cancelled.
/// Stock must never move for an order in this state.
pub const STATUS_CANCELLED: &str = "annulé";

/// Detail-fetch/match bookkeeping flag, set only by the reconciler.
///
/// Monotonic per order: `Pending` → `Processed`. Not currently read as a
/// gate anywhere; see DESIGN.md for the open product question around it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    #[default]
    Pending,
    Processed,
}

/// One purchase order from the portal's order-history table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Portal order number: a string of digits, unique across the history.
    pub order_number: String,

    /// Portal order reference (e.g. `"CMDWEB123456"`).
    #[serde(default)]
    pub reference: String,

    /// Order date, canonicalized to ISO `YYYY-MM-DD` where parseable,
    /// otherwise [`crate::normalize::INVALID_DATE`].
    #[serde(default)]
    pub date: String,

    /// Order total as a cleaned decimal string (e.g. `"87.41"`).
    #[serde(default)]
    pub total_price: String,

    /// Pickup point display name.
    #[serde(default)]
    pub pickup_point: String,

    /// Payment method display name.
    #[serde(default)]
    pub payment_method: String,

    /// Current portal status, normalized to lowercase.
    pub status: String,

    /// Status observed on the previous reconciliation pass, if the status
    /// has ever changed. Set only by the reconciler.
    #[serde(default)]
    pub previous_status: Option<String>,

    /// Detail-fetch/match bookkeeping flag. Set only by the reconciler.
    #[serde(default)]
    pub processing_status: ProcessingStatus,

    /// Link to the order-detail page, as captured by the scraper job.
    #[serde(default)]
    pub details_link: Option<String>,

    /// Line items keyed by full display name, captured on detail fetch.
    /// Empty until the order's detail page has been extracted.
    #[serde(default)]
    pub details: BTreeMap<String, LineItem>,
}

/// One purchased line item from an order's detail page.
///
/// Created once per detail fetch and embedded unchanged into the [`Order`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Manufacturer / brand part of the display name.
    #[serde(default)]
    pub name: String,

    /// Product description part of the display name.
    #[serde(default)]
    pub description: String,

    /// Category inherited from the preceding category row on the detail
    /// page, if any.
    #[serde(default)]
    pub category: Option<String>,

    /// Quantity exactly as scraped (usually a bare integer string).
    #[serde(default)]
    pub quantity: String,

    /// Unit price as a cleaned decimal string. Empty when the portal showed
    /// no price for the line.
    #[serde(default)]
    pub unit_price: String,

    /// Line total as a cleaned decimal string.
    #[serde(default)]
    pub total_price: String,

    /// Per-line discount text, cleaned.
    #[serde(default)]
    pub discount: String,

    /// Loyalty-credit text for the line, cleaned.
    #[serde(default)]
    pub loyalty_credit: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order() -> Order {
        let mut details = BTreeMap::new();
        details.insert(
            "Lactel Lait demi-écrémé 1L".to_owned(),
            LineItem {
                name: "Lactel".to_owned(),
                description: "Lait demi-écrémé 1L".to_owned(),
                category: Some("Crèmerie".to_owned()),
                quantity: "2".to_owned(),
                unit_price: "1.09".to_owned(),
                total_price: "2.18".to_owned(),
                discount: String::new(),
                loyalty_credit: String::new(),
            },
        );
        Order {
            order_number: "008123456".to_owned(),
            reference: "CMDWEB123456".to_owned(),
            date: "2024-11-02".to_owned(),
            total_price: "87.41".to_owned(),
            pickup_point: "Drive Centre".to_owned(),
            payment_method: "Carte bancaire".to_owned(),
            status: "en cours".to_owned(),
            previous_status: Some("validée".to_owned()),
            processing_status: ProcessingStatus::Pending,
            details_link: Some("https://portal.example/orders/008123456".to_owned()),
            details,
        }
    }

    #[test]
    fn order_round_trips_through_json() {
        let order = sample_order();
        let json = serde_json::to_string_pretty(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(back, order);
    }

    #[test]
    fn processing_status_serializes_lowercase() {
        let json = serde_json::to_string(&ProcessingStatus::Processed).unwrap();
        assert_eq!(json, "\"processed\"");
        let json = serde_json::to_string(&ProcessingStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
    }

    #[test]
    fn order_deserializes_with_missing_optional_fields() {
        // A minimal document written by an older version of the tool.
        let json = r#"{"order_number": "42", "status": "livré"}"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.order_number, "42");
        assert_eq!(order.processing_status, ProcessingStatus::Pending);
        assert!(order.previous_status.is_none());
        assert!(order.details.is_empty());
    }
}
