//! Type-safe identifier wrappers.
//!
//! Entities owned by collaborators (storage policies, storage locations,
//! agents, work items, item stacks) are referenced by opaque UUID v7
//! newtypes. The capacity subsystem never holds a reference to the
//! collaborator's object itself, only its id, so a destroyed policy or a
//! finished work item simply stops resolving.
//!
//! [`ResourceKind`] is the one identity that is not a UUID: resource kinds
//! are named definitions (`"steel"`, `"wood"`) shared by every stack of
//! that kind.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Identifier issued by the storage subsystem when a storage policy
    /// (allow-list plus quantity limits) is created.
    PolicyId
}

/// Namespace for policy ids derived from storage names.
const POLICY_NAMESPACE: Uuid = Uuid::from_u128(0x5f0c_4a2e_9d1b_4c7e_8a36_2b91_e4d7_c058);

impl PolicyId {
    /// Derive the id of a named storage object's policy.
    ///
    /// The same name always yields the same id, so limits saved against it
    /// resolve again after a restart.
    pub fn from_name(name: &str) -> Self {
        Self(Uuid::new_v5(&POLICY_NAMESPACE, name.as_bytes()))
    }
}

define_id! {
    /// Unique identifier for a storage location (a contiguous group of cells).
    LocationId
}

define_id! {
    /// Unique identifier for an agent.
    AgentId
}

define_id! {
    /// Unique identifier for an agent's unit of work.
    WorkItemId
}

define_id! {
    /// Unique identifier for a physical item stack.
    ItemId
}

/// Identity of an interchangeable class of storable item.
///
/// Two stacks hold the same resource when their kinds compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceKind(String);

impl ResourceKind {
    /// Create a resource kind from its definition name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Return the definition name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceKind {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
