//! `Arena`: a batch-grown slot allocator that never hands a slot out twice.
//!
//! Slots live in boxed slabs that are never resized or freed while the arena
//! lives, so every slot keeps its address. Slabs are carved onto a free list in
//! full when they are allocated; requests pop from the end of that list.
//!
//! There is deliberately no way to give a slot back. [`Arena::retire`] drops
//! the value and advances the slot generation so outstanding handles turn
//! stale, but the slot itself stays out of circulation. Code that keeps
//! handles across map mutations can rely on that.
//!
//! A slot can be pinned by a chain while it is linked. Pinned slots refuse
//! `retire` with [`ArenaError::Pinned`].

use super::{next_instance_id, ArenaConfig, SlotHandle};
use crate::error::ArenaError;
use core::fmt;

struct Slot<T> {
    generation: u32,
    pinned: bool,
    value: Option<T>,
}

impl<T> Slot<T> {
    fn vacant() -> Self {
        Self {
            generation: 0,
            pinned: false,
            value: None,
        }
    }
}

#[derive(Clone, Copy)]
struct FreeSlot {
    slab: u32,
    offset: u32,
}

/// A slab arena of `T` slots addressed by [`SlotHandle`].
pub struct Arena<T> {
    id: u32,
    config: ArenaConfig,
    slabs: Vec<Box<[Slot<T>]>>,
    free: Vec<FreeSlot>,
    /// Size of the batch allocated most recently.
    batch_size: usize,
    capacity: usize,
    issued: usize,
    retired: usize,
}

impl<T> Arena<T> {
    /// Creates an arena that allocates nothing until the first request.
    pub fn new() -> Self {
        Self::with_config(ArenaConfig::default())
    }

    /// Creates an arena whose first batch holds `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(ArenaConfig::new(capacity))
    }

    /// Creates an arena from an explicit config.
    pub fn with_config(config: ArenaConfig) -> Self {
        let mut arena = Self {
            id: next_instance_id(),
            config,
            slabs: Vec::new(),
            free: Vec::new(),
            batch_size: 0,
            capacity: 0,
            issued: 0,
            retired: 0,
        };
        if config.capacity > 0 {
            arena.push_batch(config.capacity);
        }
        arena
    }

    /// Stores `value` in a fresh slot and returns its handle.
    ///
    /// Allocates a new batch first when the free list is empty.
    pub fn alloc(&mut self, value: T) -> SlotHandle {
        if self.free.is_empty() {
            self.grow();
        }
        let Some(FreeSlot { slab, offset }) = self.free.pop() else {
            unreachable!("grow always pushes at least one slot");
        };

        let slot = &mut self.slabs[slab as usize][offset as usize];
        slot.generation = slot.generation.wrapping_add(1);
        slot.value = Some(value);
        self.issued += 1;

        SlotHandle::new(self.id, slab, offset, slot.generation)
    }

    /// Issues a fresh slot holding `T::default()`.
    pub fn alloc_default(&mut self) -> SlotHandle
    where
        T: Default,
    {
        self.alloc(T::default())
    }

    /// Returns the value behind `handle`, or why it cannot be resolved.
    pub fn try_get(&self, handle: SlotHandle) -> Result<&T, ArenaError> {
        let slot = self.locate(handle)?;
        slot.value.as_ref().ok_or(ArenaError::Stale {
            handle,
            current: slot.generation,
        })
    }

    /// Mutable counterpart of [`try_get`](Self::try_get).
    pub fn try_get_mut(&mut self, handle: SlotHandle) -> Result<&mut T, ArenaError> {
        let slot = self.locate_mut(handle)?;
        let current = slot.generation;
        slot.value
            .as_mut()
            .ok_or(ArenaError::Stale { handle, current })
    }

    /// Returns the value behind `handle` if it is live in this arena.
    #[inline]
    pub fn get(&self, handle: SlotHandle) -> Option<&T> {
        self.try_get(handle).ok()
    }

    /// Returns the value behind `handle` mutably if it is live in this arena.
    #[inline]
    pub fn get_mut(&mut self, handle: SlotHandle) -> Option<&mut T> {
        self.try_get_mut(handle).ok()
    }

    /// Moves the value out of its slot and invalidates `handle`.
    ///
    /// The slot is not returned to the free list. Fails with
    /// [`ArenaError::Pinned`] while a chain links the slot.
    pub fn retire(&mut self, handle: SlotHandle) -> Result<T, ArenaError> {
        let slot = self.locate_mut(handle)?;
        if slot.pinned {
            return Err(ArenaError::Pinned { handle });
        }
        let current = slot.generation;
        let value = slot.value.take().ok_or(ArenaError::Stale { handle, current })?;
        slot.generation = current.wrapping_add(1);
        self.retired += 1;
        Ok(value)
    }

    /// Returns `true` if `handle` resolves to a live slot of this arena.
    pub fn contains(&self, handle: SlotHandle) -> bool {
        self.try_get(handle).is_ok()
    }

    /// Returns `true` if a chain currently holds the slot behind `handle`.
    pub fn is_pinned(&self, handle: SlotHandle) -> bool {
        self.locate(handle).is_ok_and(|slot| slot.pinned)
    }

    pub(crate) fn set_pinned(
        &mut self,
        handle: SlotHandle,
        pinned: bool,
    ) -> Result<(), ArenaError> {
        let slot = self.locate_mut(handle)?;
        if slot.value.is_none() {
            return Err(ArenaError::Stale {
                handle,
                current: slot.generation,
            });
        }
        slot.pinned = pinned;
        Ok(())
    }

    /// Identity stamped into every handle this arena issues.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The config this arena was built with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Total slots handed out over the arena's lifetime.
    pub fn issued(&self) -> usize {
        self.issued
    }

    /// Slots handed out and not yet retired.
    pub fn live(&self) -> usize {
        self.issued - self.retired
    }

    /// Slots allocated but not yet handed out.
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Total slots across all batches.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Size of the most recent batch (the constructor hint before any growth).
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of batches allocated so far.
    pub fn batch_count(&self) -> usize {
        self.slabs.len()
    }

    fn locate(&self, handle: SlotHandle) -> Result<&Slot<T>, ArenaError> {
        let foreign = ArenaError::Foreign {
            handle,
            arena: self.id,
        };
        if handle.arena != self.id {
            return Err(foreign);
        }
        let slot = self
            .slabs
            .get(handle.slab as usize)
            .and_then(|slab| slab.get(handle.offset as usize))
            .ok_or(foreign)?;
        if slot.generation != handle.generation {
            return Err(ArenaError::Stale {
                handle,
                current: slot.generation,
            });
        }
        Ok(slot)
    }

    fn locate_mut(&mut self, handle: SlotHandle) -> Result<&mut Slot<T>, ArenaError> {
        let foreign = ArenaError::Foreign {
            handle,
            arena: self.id,
        };
        if handle.arena != self.id {
            return Err(foreign);
        }
        let slot = self
            .slabs
            .get_mut(handle.slab as usize)
            .and_then(|slab| slab.get_mut(handle.offset as usize))
            .ok_or(foreign)?;
        if slot.generation != handle.generation {
            return Err(ArenaError::Stale {
                handle,
                current: slot.generation,
            });
        }
        Ok(slot)
    }

    fn grow(&mut self) {
        let line = self
            .config
            .next_batch_size(self.batch_size, self.free.capacity());
        self.push_batch(line);
    }

    fn push_batch(&mut self, requested: usize) {
        // Offsets are stored as `u32`.
        let max_batch = usize::try_from(u32::MAX).unwrap_or(usize::MAX);
        let line = requested.min(max_batch);
        #[cfg(feature = "tracing")]
        if line < requested {
            tracing::warn!(
                arena = self.id,
                requested,
                batch = line,
                "arena batch clamped to the u32 offset range"
            );
        }
        let Ok(slab) = u32::try_from(self.slabs.len()) else {
            panic!("arena {} exceeded u32::MAX batches", self.id);
        };

        // Exact reservation keeps the buffered capacity equal to the batch,
        // so the growth guard only fires when storage really is larger.
        self.free.reserve_exact(line);
        self.free.extend(
            (0..=u32::MAX)
                .take(line)
                .map(|offset| FreeSlot { slab, offset }),
        );
        self.slabs.push((0..line).map(|_| Slot::vacant()).collect());
        self.capacity += line;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            arena = self.id,
            batch = line,
            previous = self.batch_size,
            slabs = self.slabs.len(),
            "arena allocated batch"
        );

        self.batch_size = line;
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("id", &self.id)
            .field("issued", &self.issued)
            .field("live", &self.live())
            .field("available", &self.free.len())
            .field("capacity", &self.capacity)
            .field("batch_size", &self.batch_size)
            .field("batch_count", &self.slabs.len())
            .finish()
    }
}
