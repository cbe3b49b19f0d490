//! Persisted form of the limit registry.
//!
//! The persistence layer stores limits as a flat list of
//! `(policy, kind, limit)` triples. A policy absent from the list is
//! unlimited for every kind.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stockcap_types::LimitEntry;
use tracing::info;

use crate::LimitError;

/// A point-in-time copy of every configured limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitSnapshot {
    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,
    /// Every configured limit, sorted by policy then kind.
    #[serde(default)]
    pub entries: Vec<LimitEntry>,
}

impl LimitSnapshot {
    /// Wrap a list of entries, stamped with the current time.
    pub fn new(entries: Vec<LimitEntry>) -> Self {
        Self {
            saved_at: Utc::now(),
            entries,
        }
    }

    /// Encode as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, LimitError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from JSON.
    pub fn from_json(json: &str) -> Result<Self, LimitError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the snapshot to `path`.
    pub fn save(&self, path: &Path) -> Result<(), LimitError> {
        std::fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), entries = self.entries.len(), "limit snapshot saved");
        Ok(())
    }

    /// Read a snapshot from `path`.
    pub fn load(path: &Path) -> Result<Self, LimitError> {
        let contents = std::fs::read_to_string(path)?;
        let snapshot = Self::from_json(&contents)?;
        info!(path = %path.display(), entries = snapshot.entries.len(), "limit snapshot loaded");
        Ok(snapshot)
    }
}
