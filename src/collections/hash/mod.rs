//! Hash-indexed collections.
//!
//! `OrderedMap` keeps a std `HashMap` from keys to node handles and threads
//! the nodes through a [`Chain`](super::Chain) to remember insertion order.

pub mod ordered_map;

pub use ordered_map::{delete, Iter, Keys, OrderedMap, Values};
