//! One end-to-end sync pass: scrape dump → typed orders → reconciliation →
//! detail attach → catalog matching → history save.
//!
//! Failures that concern a single order are logged and skipped; only
//! source/history-level failures abort the pass.

use anyhow::Context;

use drivesync_core::extract::{extract_details, extract_orders};
use drivesync_inventory::MatchEngine;
use drivesync_recon::{reconcile, HistoryStore, Reconciliation};

use crate::source::OrderSource;

/// What one pass did, for the completion log line.
#[derive(Debug)]
pub(crate) struct PassSummary {
    pub scraped_rows: usize,
    pub extracted_orders: usize,
    pub needs_detail: usize,
    pub matched_orders: usize,
    pub saved: bool,
}

/// Runs a single sync pass.
///
/// # Errors
///
/// Fails when the source cannot produce the order rows or the history
/// cannot be loaded or saved. Everything scoped to one order (a missing
/// detail capture, an empty detail table, an unavailable catalog) is
/// logged and skipped instead.
pub(crate) async fn run_sync_pass<S: OrderSource>(
    source: &S,
    store: &HistoryStore,
    engine: &MatchEngine,
) -> anyhow::Result<PassSummary> {
    let rows = source
        .fetch_order_rows()
        .await
        .context("failed to fetch scraped order rows")?;
    let fresh = extract_orders(&rows);
    tracing::info!(
        scraped_rows = rows.len(),
        extracted_orders = fresh.len(),
        "scraped order batch extracted"
    );

    let extracted_orders = fresh.len();
    let persisted = store.load().context("failed to load order history")?;
    let Reconciliation {
        mut history,
        needs_detail,
        changed,
    } = reconcile(fresh, persisted);

    let mut matched_orders = 0;
    for order_number in &needs_detail {
        let Some(order) = history
            .iter_mut()
            .find(|o| &o.order_number == order_number)
        else {
            continue;
        };

        match source.fetch_order_detail(order).await {
            Ok(detail_rows) => {
                let details = extract_details(&detail_rows);
                if details.is_empty() {
                    tracing::warn!(
                        order_number = %order_number,
                        "detail capture has no line items; leaving order pending"
                    );
                    continue;
                }
                order.details = details;
            }
            Err(e) => {
                tracing::warn!(
                    order_number = %order_number,
                    error = %e,
                    "failed to fetch order details; leaving order pending"
                );
                continue;
            }
        }

        // processing_status is the reconciler's field; the pass only counts.
        if engine.process(order).await.is_some() {
            matched_orders += 1;
        }
    }

    if changed {
        store.save(&history).context("failed to save order history")?;
    } else {
        tracing::debug!("no new or changed orders; skipping history save");
    }

    Ok(PassSummary {
        scraped_rows: rows.len(),
        extracted_orders,
        needs_detail: needs_detail.len(),
        matched_orders,
        saved: changed,
    })
}
