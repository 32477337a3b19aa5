//! # `ordpool` - Arena-backed Ordered Collections
//!
//! An insertion-ordered hash map built from three layers:
//!
//! 1. **[`Arena`]**: hands out slots of a single element type from boxed
//!    batches that grow by doubling up to a threshold (512 by default) and by
//!    25% after it. A slot is issued at most once for the arena's lifetime.
//! 2. **[`Chain`]**: a doubly linked sequence whose nodes ([`Link`]) live in an
//!    arena and refer to each other by [`SlotHandle`].
//! 3. **[`OrderedMap`]**: a hash index from keys to node handles over a chain,
//!    giving O(1) lookup, insertion and removal with insertion-order
//!    iteration.
//!
//! ## Handles instead of pointers
//!
//! Nodes never hold references to one another. A [`SlotHandle`] carries the
//! issuing arena's identity, the slot coordinates and a generation, so a
//! handle from another arena, or one whose node was retired, is rejected with
//! an [`ArenaError`] or [`ChainError`] rather than followed.
//!
//! ## Threading
//!
//! Nothing here locks. To share a map between threads, wrap it in a
//! [`SyncValue`] and run each whole operation inside its callbacks.
//!
//! ## Example
//!
//! ```rust
//! use ordpool::OrderedMap;
//!
//! let mut map = OrderedMap::with_capacity(10);
//! map.insert("a", 1);
//! map.insert("b", 2);
//! map.insert("a", 100);
//!
//! assert_eq!(map.to_values(), vec![100, 2]);
//! assert_eq!(map.remove("a"), Some(100));
//! assert_eq!(map.iter().collect::<Vec<_>>(), vec![(&"b", &2)]);
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![forbid(unsafe_code)]

pub mod alloc;
pub mod collections;
pub mod concurrency;
pub mod error;

pub use alloc::{Arena, ArenaConfig, SlotHandle};
pub use collections::{delete, Chain, Link, OrderedMap};
pub use concurrency::SyncValue;
pub use error::{ArenaError, ChainError};

// Handles are copied into every index entry and link; keep them compact.
const _: () = {
    use core::mem;

    assert!(mem::size_of::<SlotHandle>() == 16);
    assert!(mem::size_of::<Option<SlotHandle>>() <= 20);
};
