//! Error types for dm-core
//!
//! Re-exports the shared error crate so callers only depend on dm-core.

pub use dm_error::{DmiError, Result};
