//! Slot handles and instance identities.
//!
//! A [`SlotHandle`] names one slot of one [`Arena`](super::Arena). It stays the
//! same for the slot's whole life, so it can be copied into hash indexes and
//! neighbour links freely. The generation allows O(1) staleness checks.

use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

static NEXT_INSTANCE_ID: AtomicU32 = AtomicU32::new(1);

/// Returns a process-unique identity for an arena or chain.
///
/// Identity 0 is never handed out.
pub(crate) fn next_instance_id() -> u32 {
    loop {
        let id = NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed);
        if id != 0 {
            return id;
        }
    }
}

/// Stable reference to a slot inside an [`Arena`](super::Arena).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotHandle {
    pub(crate) arena: u32,
    pub(crate) slab: u32,
    pub(crate) offset: u32,
    pub(crate) generation: u32,
}

impl SlotHandle {
    pub(crate) fn new(arena: u32, slab: u32, offset: u32, generation: u32) -> Self {
        Self {
            arena,
            slab,
            offset,
            generation,
        }
    }

    /// Identity of the arena that issued this handle.
    pub fn arena_id(&self) -> u32 {
        self.arena
    }

    /// Index of the batch the slot lives in.
    pub fn slab(&self) -> u32 {
        self.slab
    }

    /// Position of the slot inside its batch.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Slot generation at the time the handle was issued.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for SlotHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SlotHandle(arena={}, slab={}, off={}, gen={})",
            self.arena, self.slab, self.offset, self.generation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_ids_are_distinct_and_non_zero() {
        let a = next_instance_id();
        let b = next_instance_id();
        assert_ne!(a, 0);
        assert_ne!(b, 0);
        assert_ne!(a, b);
    }

    #[test]
    fn display_names_every_coordinate() {
        let h = SlotHandle::new(7, 2, 31, 1);
        assert_eq!(h.to_string(), "SlotHandle(arena=7, slab=2, off=31, gen=1)");
    }
}
