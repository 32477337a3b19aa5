//! Concurrency helpers.
//!
//! Important: the collections themselves are single-threaded. This module
//! provides the wrapper callers place around a whole collection to share it.

pub mod sync_value;

pub use sync_value::SyncValue;
