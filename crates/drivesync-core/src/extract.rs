//! Conversion from raw scraped rows to typed [`Order`] / [`LineItem`] values.
//!
//! The scraper job captures table cells as untyped text and may miss cells
//! entirely when the portal markup shifts, so every raw field is optional.
//! Extraction is where the soft-failure policy lives: a malformed row is
//! logged and dropped, and the rest of the batch continues.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::normalize::{clean_date, clean_price, clean_string};
use crate::orders::{LineItem, Order, ProcessingStatus};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("order row is missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("order number {value:?} is not a string of digits")]
    InvalidOrderNumber { value: String },
}

/// One row of the portal's order-history table, exactly as captured by the
/// scraper job. Any cell may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawOrderRow {
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub total_price: Option<String>,
    #[serde(default)]
    pub pickup_point: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub details_link: Option<String>,
}

/// One row of an order's detail table, in page order.
///
/// The portal interleaves category header rows with product rows; a
/// category row applies to every product row until the next category row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawDetailRow {
    Category {
        name: String,
    },
    Item {
        #[serde(default)]
        name: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        quantity: String,
        #[serde(default)]
        unit_price: String,
        #[serde(default)]
        total_price: String,
        #[serde(default)]
        discount: String,
        #[serde(default)]
        loyalty_credit: String,
    },
}

/// Extracts a typed [`Order`] from one raw table row.
///
/// `order_number` and `status` are required; everything else degrades to an
/// empty/cleaned value. The status is normalized to lowercase here so the
/// reconciler compares like with like. `previous_status` and
/// `processing_status` are left at their defaults; only the reconciler
/// assigns them.
///
/// # Errors
///
/// Returns [`ExtractError::MissingField`] when `order_number` or `status`
/// is absent or blank, and [`ExtractError::InvalidOrderNumber`] when the
/// order number contains anything but ASCII digits.
pub fn extract_order(row: &RawOrderRow) -> Result<Order, ExtractError> {
    let order_number = row
        .order_number
        .as_deref()
        .map(clean_string)
        .filter(|s| !s.is_empty())
        .ok_or(ExtractError::MissingField {
            field: "order_number",
        })?;
    if !order_number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ExtractError::InvalidOrderNumber {
            value: order_number,
        });
    }

    let status = row
        .status
        .as_deref()
        .map(clean_string)
        .filter(|s| !s.is_empty())
        .ok_or(ExtractError::MissingField { field: "status" })?
        .to_lowercase();

    let clean_opt = |value: &Option<String>| value.as_deref().map(clean_string).unwrap_or_default();

    Ok(Order {
        order_number,
        reference: clean_opt(&row.reference),
        date: row.date.as_deref().map(clean_date).unwrap_or_default(),
        total_price: row
            .total_price
            .as_deref()
            .map(clean_price)
            .unwrap_or_default(),
        pickup_point: clean_opt(&row.pickup_point),
        payment_method: clean_opt(&row.payment_method),
        status,
        previous_status: None,
        processing_status: ProcessingStatus::default(),
        details_link: row
            .details_link
            .as_deref()
            .map(clean_string)
            .filter(|s| !s.is_empty()),
        details: BTreeMap::new(),
    })
}

/// Extracts a full scraped batch, dropping malformed rows.
///
/// Per-row failures are logged at warn and skipped; one bad row never
/// aborts the run.
#[must_use]
pub fn extract_orders(rows: &[RawOrderRow]) -> Vec<Order> {
    let mut orders = Vec::with_capacity(rows.len());
    for row in rows {
        match extract_order(row) {
            Ok(order) => orders.push(order),
            Err(e) => {
                tracing::warn!(error = %e, "dropping malformed order row");
            }
        }
    }
    orders
}

/// Extracts an order's line items from its detail rows.
///
/// Category rows set the category inherited by the product rows that
/// follow them. The map key is the full display name
/// (`"{name} {description}"`, cleaned); rows with an empty full name are
/// skipped the way the portal's own spacer rows are.
#[must_use]
pub fn extract_details(rows: &[RawDetailRow]) -> BTreeMap<String, LineItem> {
    let mut details = BTreeMap::new();
    let mut current_category: Option<String> = None;

    for row in rows {
        match row {
            RawDetailRow::Category { name } => {
                let name = clean_string(name);
                current_category = (!name.is_empty()).then_some(name);
            }
            RawDetailRow::Item {
                name,
                description,
                quantity,
                unit_price,
                total_price,
                discount,
                loyalty_credit,
            } => {
                let full_name = clean_string(&format!("{name} {description}"));
                if full_name.is_empty() {
                    continue;
                }
                details.insert(
                    full_name,
                    LineItem {
                        name: clean_string(name),
                        description: clean_string(description),
                        category: current_category.clone(),
                        quantity: clean_string(quantity),
                        unit_price: clean_price(unit_price),
                        total_price: clean_price(total_price),
                        discount: clean_string(discount),
                        loyalty_credit: clean_string(loyalty_credit),
                    },
                );
            }
        }
    }

    details
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_row() -> RawOrderRow {
        RawOrderRow {
            order_number: Some(" 008123456 ".to_owned()),
            reference: Some("CMDWEB123456\n".to_owned()),
            date: Some("02/11/2024".to_owned()),
            total_price: Some("87,41 €".to_owned()),
            pickup_point: Some("Drive  Centre".to_owned()),
            payment_method: Some("Carte bancaire".to_owned()),
            status: Some("  Livré ".to_owned()),
            details_link: Some("https://portal.example/orders/008123456".to_owned()),
        }
    }

    #[test]
    fn extract_order_normalizes_every_field() {
        let order = extract_order(&full_row()).unwrap();
        assert_eq!(order.order_number, "008123456");
        assert_eq!(order.reference, "CMDWEB123456");
        assert_eq!(order.date, "2024-11-02");
        assert_eq!(order.total_price, "87.41");
        assert_eq!(order.pickup_point, "Drive Centre");
        assert_eq!(order.status, "livré");
        assert_eq!(order.previous_status, None);
        assert_eq!(order.processing_status, ProcessingStatus::Pending);
    }

    #[test]
    fn extract_order_requires_order_number() {
        let mut row = full_row();
        row.order_number = None;
        let err = extract_order(&row).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MissingField {
                field: "order_number"
            }
        ));
    }

    #[test]
    fn extract_order_requires_status() {
        let mut row = full_row();
        row.status = Some("  ".to_owned());
        let err = extract_order(&row).unwrap_err();
        assert!(matches!(err, ExtractError::MissingField { field: "status" }));
    }

    #[test]
    fn extract_order_rejects_non_digit_order_number() {
        let mut row = full_row();
        row.order_number = Some("CMD-42".to_owned());
        let err = extract_order(&row).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidOrderNumber { .. }));
    }

    #[test]
    fn extract_order_unparseable_date_degrades_to_sentinel() {
        let mut row = full_row();
        row.date = Some("demain".to_owned());
        let order = extract_order(&row).unwrap();
        assert_eq!(order.date, crate::normalize::INVALID_DATE);
    }

    #[test]
    fn extract_orders_drops_bad_rows_and_keeps_the_rest() {
        let rows = vec![
            full_row(),
            RawOrderRow::default(), // missing everything
            {
                let mut r = full_row();
                r.order_number = Some("008999999".to_owned());
                r
            },
        ];
        let orders = extract_orders(&rows);
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].order_number, "008123456");
        assert_eq!(orders[1].order_number, "008999999");
    }

    #[test]
    fn extract_details_inherits_category_until_next_header() {
        let rows = vec![
            RawDetailRow::Category {
                name: " Crèmerie ".to_owned(),
            },
            RawDetailRow::Item {
                name: "Lactel".to_owned(),
                description: "Lait demi-écrémé 1L".to_owned(),
                quantity: "2".to_owned(),
                unit_price: "1,09 €".to_owned(),
                total_price: "2,18 €".to_owned(),
                discount: String::new(),
                loyalty_credit: String::new(),
            },
            RawDetailRow::Category {
                name: "Épicerie".to_owned(),
            },
            RawDetailRow::Item {
                name: "Panzani".to_owned(),
                description: "Spaghetti 500g".to_owned(),
                quantity: "1".to_owned(),
                unit_price: "1,35 €".to_owned(),
                total_price: "1,35 €".to_owned(),
                discount: String::new(),
                loyalty_credit: String::new(),
            },
        ];

        let details = extract_details(&rows);
        assert_eq!(details.len(), 2);

        let milk = &details["Lactel Lait demi-écrémé 1L"];
        assert_eq!(milk.category.as_deref(), Some("Crèmerie"));
        assert_eq!(milk.unit_price, "1.09");
        assert_eq!(milk.quantity, "2");

        let pasta = &details["Panzani Spaghetti 500g"];
        assert_eq!(pasta.category.as_deref(), Some("Épicerie"));
    }

    #[test]
    fn extract_details_skips_empty_names() {
        let rows = vec![RawDetailRow::Item {
            name: "  ".to_owned(),
            description: String::new(),
            quantity: "1".to_owned(),
            unit_price: String::new(),
            total_price: String::new(),
            discount: String::new(),
            loyalty_credit: String::new(),
        }];
        assert!(extract_details(&rows).is_empty());
    }

    #[test]
    fn extract_details_item_before_any_category_has_none() {
        let rows = vec![RawDetailRow::Item {
            name: "Lactel".to_owned(),
            description: "Lait 1L".to_owned(),
            quantity: "1".to_owned(),
            unit_price: "1,09".to_owned(),
            total_price: "1,09".to_owned(),
            discount: String::new(),
            loyalty_credit: String::new(),
        }];
        let details = extract_details(&rows);
        assert!(details["Lactel Lait 1L"].category.is_none());
    }
}
