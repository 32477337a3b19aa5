//! Linkage over arena-owned nodes.

pub mod chain;

pub use chain::{Chain, Handles, Iter, Link};
