//! Slot allocation.
//!
//! [`Arena`] supplies the node storage every collection in this crate links
//! together; [`SlotHandle`] is how those nodes refer to one another.

pub mod arena;
pub mod config;
pub mod handle;

pub use arena::Arena;
pub use config::ArenaConfig;
pub use handle::SlotHandle;

pub(crate) use handle::next_instance_id;
