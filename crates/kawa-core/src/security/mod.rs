//! Security checks applied to untrusted archive entries.
//!
//! Path containment lives in [`SafePath`](crate::types::SafePath).

pub mod permissions;

pub use permissions::sanitize_permissions;
