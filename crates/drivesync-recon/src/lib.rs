//! Order-history persistence and reconciliation for drivesync.
//!
//! The history is the system's only durable state: an ordered JSON document
//! of every order ever scraped, most recent first. Reconciliation diffs a
//! fresh scrape against it, decides which orders still need their detail
//! pages fetched and matched, and merges the fresh observations in.

pub mod history;
pub mod reconcile;

pub use history::{HistoryError, HistoryStore};
pub use reconcile::{reconcile, Reconciliation};
