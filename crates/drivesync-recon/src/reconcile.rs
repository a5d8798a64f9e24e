//! Diffing a fresh scrape against the persisted order history.
//!
//! The reconciler is pure: it takes the fresh batch and the loaded history,
//! and returns the merged history, the set of order numbers that still need
//! their detail pages fetched and matched, and whether anything changed at
//! all (so an unchanged pass can skip the disk write). All I/O, from detail
//! fetching to matching and saving, is the caller's phase.

use std::collections::HashMap;

use drivesync_core::orders::{Order, ProcessingStatus, STATUS_CANCELLED, STATUS_DELIVERED};

/// Outcome of one reconciliation pass.
#[derive(Debug)]
pub struct Reconciliation {
    /// The merged history, most recent first: new orders from this batch
    /// are prepended as a block in scrape order; updated orders keep their
    /// original position.
    pub history: Vec<Order>,
    /// Order numbers whose detail pages should be fetched and matched this
    /// pass. Numbers rather than clones; the caller resolves them against
    /// `history` so attached details land in the persisted records.
    pub needs_detail: Vec<String>,
    /// False when the batch contained no new and no changed orders; the
    /// caller skips the history write in that case.
    pub changed: bool,
}

/// Merges a fresh scrape into the persisted history.
///
/// Per fresh order (status compared lowercase):
/// - known, status unchanged → untouched, not queued;
/// - known, status changed → `previous_status` takes the old value,
///   `processing_status` resets to pending, fresh fields overwrite the
///   record in place (already-captured details are kept when the fresh row
///   carries none). A change *to* the cancelled terminal status is
///   persisted but not queued; stock must never move for a cancelled
///   order;
/// - new → queued unconditionally; `processing_status` starts as processed
///   when the order is already delivered, pending otherwise. The flag does
///   not gate queueing (see DESIGN.md).
///
/// Running the same batch twice yields `changed == false` and an empty
/// queue on the second pass.
#[must_use]
pub fn reconcile(fresh: Vec<Order>, mut history: Vec<Order>) -> Reconciliation {
    let index: HashMap<String, usize> = history
        .iter()
        .enumerate()
        .map(|(pos, order)| (order.order_number.clone(), pos))
        .collect();

    let mut needs_detail: Vec<String> = Vec::new();
    let mut new_orders: Vec<Order> = Vec::new();
    let mut changed = false;

    for mut fresh_order in fresh {
        fresh_order.status = fresh_order.status.to_lowercase();

        if let Some(&pos) = index.get(&fresh_order.order_number) {
            let existing = &mut history[pos];
            if existing.status == fresh_order.status {
                continue;
            }

            changed = true;
            let old_status = std::mem::replace(&mut existing.status, fresh_order.status);
            tracing::info!(
                order_number = %existing.order_number,
                from = %old_status,
                to = %existing.status,
                "order status changed"
            );

            existing.previous_status = Some(old_status);
            existing.processing_status = ProcessingStatus::Pending;
            existing.reference = fresh_order.reference;
            existing.date = fresh_order.date;
            existing.total_price = fresh_order.total_price;
            existing.pickup_point = fresh_order.pickup_point;
            existing.payment_method = fresh_order.payment_method;
            existing.details_link = fresh_order.details_link;
            if !fresh_order.details.is_empty() {
                existing.details = fresh_order.details;
            }

            if existing.status == STATUS_CANCELLED {
                tracing::info!(
                    order_number = %existing.order_number,
                    "order cancelled; excluded from detail processing"
                );
            } else {
                needs_detail.push(existing.order_number.clone());
            }
        } else {
            changed = true;
            fresh_order.previous_status = None;
            fresh_order.processing_status = if fresh_order.status == STATUS_DELIVERED {
                ProcessingStatus::Processed
            } else {
                ProcessingStatus::Pending
            };
            tracing::info!(
                order_number = %fresh_order.order_number,
                status = %fresh_order.status,
                "new order discovered"
            );
            needs_detail.push(fresh_order.order_number.clone());
            new_orders.push(fresh_order);
        }
    }

    // Prepend the new block: the scrape is recency-descending, so batch
    // order in front of the existing list keeps most-recent-first.
    new_orders.append(&mut history);

    Reconciliation {
        history: new_orders,
        needs_detail,
        changed,
    }
}
