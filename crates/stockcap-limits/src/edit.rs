//! Operator edit path for quantity limits.
//!
//! The configuration UI shows a small numeric field next to each resource
//! kind in a storage filter. What the operator types goes through
//! [`LimitEdit::apply`]; what the field shows comes from
//! [`LimitEdit::display_value`].

use std::num::{IntErrorKind, NonZeroU32};

use stockcap_types::{PolicyId, ResourceKind, StorageKind};
use tracing::warn;

use crate::LimitError;
use crate::registry::LimitRegistry;

/// Largest limit the edit field accepts unless configured otherwise.
pub const DEFAULT_MAX_EDITABLE_LIMIT: u32 = 9999;

/// Parses edit-buffer input into registry changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitEdit {
    max_limit: u32,
}

impl Default for LimitEdit {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EDITABLE_LIMIT)
    }
}

impl LimitEdit {
    /// Create an editor that clamps values to `max_limit`.
    pub const fn new(max_limit: u32) -> Self {
        Self { max_limit }
    }

    /// Return the largest value this editor will store.
    pub const fn max_limit(self) -> u32 {
        self.max_limit
    }

    /// Apply the operator's edit buffer to the registry.
    ///
    /// Blank, `0` and negative input clear the limit. Values above the
    /// maximum are clamped. Returns the limit now in effect.
    ///
    /// # Errors
    ///
    /// [`LimitError::NotStorage`] when `owner` is not bounded storage,
    /// [`LimitError::InvalidInput`] when the buffer is not an integer.
    pub fn apply(
        self,
        registry: &mut LimitRegistry,
        owner: StorageKind,
        policy: PolicyId,
        kind: &ResourceKind,
        input: &str,
    ) -> Result<Option<NonZeroU32>, LimitError> {
        if !owner.is_bounded_storage() {
            warn!(policy = %policy, owner = ?owner, "limit edit on non-storage filter rejected");
            return Err(LimitError::NotStorage { owner });
        }

        let trimmed = input.trim();
        let value = if trimmed.is_empty() {
            0
        } else {
            match trimmed.parse::<i64>() {
                Ok(value) => value,
                // Out-of-range digits saturate and are clamped below.
                Err(e) if *e.kind() == IntErrorKind::PosOverflow => i64::MAX,
                Err(e) if *e.kind() == IntErrorKind::NegOverflow => i64::MIN,
                Err(_) => {
                    return Err(LimitError::InvalidInput {
                        input: input.to_owned(),
                    });
                }
            }
        };

        let clamped = value.min(i64::from(self.max_limit));
        registry.set_limit(policy, kind, clamped);
        Ok(registry.get_limit(policy, kind))
    }

    /// Render the current limit for the edit field. Unlimited shows blank.
    pub fn display_value(
        registry: &LimitRegistry,
        policy: PolicyId,
        kind: &ResourceKind,
    ) -> String {
        registry
            .get_limit(policy, kind)
            .map_or_else(String::new, |limit| limit.to_string())
    }
}
