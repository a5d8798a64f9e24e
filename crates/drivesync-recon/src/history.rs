//! Durable order-history document.
//!
//! A single JSON list-of-objects file, rewritten wholesale on every change
//! (no append log). Values round-trip losslessly; nothing is reshaped on
//! reload. Writes go through a sibling temp file plus rename so an
//! interrupted save never leaves a truncated document behind.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

use drivesync_core::orders::Order;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to read order history {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("order history {path} is not a valid order document: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write order history {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize order history: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted history. A missing file is an empty history,
    /// the normal state on first run, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Read`] for any I/O failure other than
    /// file-not-found, and [`HistoryError::Parse`] when the document does
    /// not deserialize as an order list.
    pub fn load(&self) -> Result<Vec<Order>, HistoryError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no history document yet; starting empty");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(HistoryError::Read {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        serde_json::from_str(&raw).map_err(|e| HistoryError::Parse {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Rewrites the whole history document atomically (temp file + rename).
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Serialize`] if the orders cannot be encoded
    /// and [`HistoryError::Write`] for any I/O failure.
    pub fn save(&self, orders: &[Order]) -> Result<(), HistoryError> {
        let document = serde_json::to_string_pretty(orders)?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, document).map_err(|e| HistoryError::Write {
            path: tmp_path.clone(),
            source: e,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|e| HistoryError::Write {
            path: self.path.clone(),
            source: e,
        })?;

        tracing::info!(
            path = %self.path.display(),
            orders = orders.len(),
            "order history saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use drivesync_core::orders::ProcessingStatus;

    use super::*;

    fn order(number: &str, status: &str) -> Order {
        Order {
            order_number: number.to_owned(),
            reference: format!("CMDWEB{number}"),
            date: "2024-11-02".to_owned(),
            total_price: "87.41".to_owned(),
            pickup_point: "Drive Centre".to_owned(),
            payment_method: "Carte bancaire".to_owned(),
            status: status.to_owned(),
            previous_status: None,
            processing_status: ProcessingStatus::Pending,
            details_link: None,
            details: BTreeMap::new(),
        }
    }

    #[test]
    fn load_missing_file_is_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("order_history.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("order_history.json"));

        let orders = vec![order("2", "en cours"), order("1", "livré")];
        store.save(&orders).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, orders);
    }

    #[test]
    fn save_overwrites_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("order_history.json"));

        store.save(&[order("1", "en cours")]).unwrap();
        store.save(&[order("1", "livré"), order("2", "en cours")]).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].status, "livré");
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order_history.json");
        let store = HistoryStore::new(&path);
        store.save(&[order("1", "livré")]).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn load_corrupt_document_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order_history.json");
        fs::write(&path, "{ not an order list").unwrap();

        let err = HistoryStore::new(&path).load().unwrap_err();
        assert!(matches!(err, HistoryError::Parse { .. }));
    }
}
