//! Collections built on [`Arena`](crate::alloc::Arena) slots.
//!
//! Collections are organized by data structure type:
//! - `hash`: Hash-indexed maps
//! - `other`: Linkage primitives (the intrusive chain)

pub mod hash;
pub mod other;

pub use hash::{delete, OrderedMap};
pub use other::{Chain, Link};
