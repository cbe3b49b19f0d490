//! Configured quantity limits for storage policies.
//!
//! A storage policy (the rule-set a stockpile or shelf owns) can cap how
//! many units of each resource kind its locations may hold. This crate is
//! the only place those caps live; every capacity decision downstream reads
//! them through [`LimitRegistry`].
//!
//! # Modules
//!
//! - [`registry`] -- [`QuantityLimitMap`] per policy and the [`LimitRegistry`]
//!   holding all of them.
//! - [`snapshot`] -- [`LimitSnapshot`]: the `(policy, kind, limit)` triples
//!   handed to the persistence layer, encoded as JSON.
//! - [`edit`] -- [`LimitEdit`]: the operator edit path, parsing a numeric
//!   edit buffer into a registry change.
//!
//! # Normalisation
//!
//! A limit is always a positive integer. Setting zero or a negative value
//! removes the entry, and a missing entry means "unlimited":
//!
//! ```
//! use stockcap_limits::LimitRegistry;
//! use stockcap_types::{PolicyId, ResourceKind};
//!
//! let mut registry = LimitRegistry::new();
//! let policy = PolicyId::new();
//! let steel = ResourceKind::new("steel");
//!
//! registry.set_limit(policy, &steel, 75);
//! assert_eq!(registry.get_limit(policy, &steel).map(|l| l.get()), Some(75));
//!
//! registry.set_limit(policy, &steel, 0);
//! assert!(registry.get_limit(policy, &steel).is_none());
//! assert!(!registry.has_any_limit(policy));
//! ```

pub mod edit;
pub mod registry;
pub mod snapshot;

// Re-export primary types at crate root.
pub use edit::{DEFAULT_MAX_EDITABLE_LIMIT, LimitEdit};
pub use registry::{LimitRegistry, QuantityLimitMap};
pub use snapshot::LimitSnapshot;

use stockcap_types::StorageKind;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised on the edges of the limit registry: operator edits and
/// snapshot encoding. Capacity reads never fail.
#[derive(Debug, thiserror::Error)]
pub enum LimitError {
    /// The edit buffer did not contain an integer.
    #[error("limit must be a whole number, got {input:?}")]
    InvalidInput {
        /// The rejected edit buffer.
        input: String,
    },

    /// Limits were edited on something that is not bounded storage.
    #[error("quantity limits only apply to storage, not {owner:?}")]
    NotStorage {
        /// The kind of object that owns the filter.
        owner: StorageKind,
    },

    /// Failed to read or write a snapshot file.
    #[error("snapshot I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A snapshot could not be encoded or decoded.
    #[error("snapshot JSON is invalid: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
