//! `Chain`: an intrusive doubly linked sequence over arena-owned nodes.
//!
//! The chain owns only its linkage: head, tail and a count. Node storage
//! belongs to an [`Arena`] of [`Link`]s, which is passed into every operation
//! that reads or rewrites links. Each `Link` records which chain currently
//! links it, so unlinking a node the chain does not hold, or linking a node
//! twice, is reported instead of corrupting the count.
//!
//! A chain binds to the arena of its first node and pins every node it links,
//! so [`Arena::retire`] refuses a linked node. [`Chain::retire`] unlinks and
//! retires in one step.

use crate::alloc::{next_instance_id, Arena, SlotHandle};
use crate::error::{ArenaError, ChainError};
use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;

/// A chain node: a value plus its neighbour handles.
#[derive(Debug, Clone)]
pub struct Link<T> {
    value: T,
    prev: Option<SlotHandle>,
    next: Option<SlotHandle>,
    owner: Option<u32>,
}

impl<T> Link<T> {
    /// A node that no chain links yet.
    pub fn new(value: T) -> Self {
        Self {
            value,
            prev: None,
            next: None,
            owner: None,
        }
    }

    /// The stored value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// The stored value, mutably. Linkage is not reachable this way.
    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    /// Unwraps the stored value.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Handle of the previous node, `None` at the head or when unlinked.
    pub fn prev(&self) -> Option<SlotHandle> {
        self.prev
    }

    /// Handle of the next node, `None` at the tail or when unlinked.
    pub fn next(&self) -> Option<SlotHandle> {
        self.next
    }

    /// Identity of the chain that links this node.
    pub fn owner(&self) -> Option<u32> {
        self.owner
    }

    /// Returns `true` while some chain links this node.
    pub fn is_linked(&self) -> bool {
        self.owner.is_some()
    }

    fn unlink(&mut self) {
        self.prev = None;
        self.next = None;
        self.owner = None;
    }
}

/// Insertion-ordered linkage over [`Link<T>`] nodes stored in an [`Arena`].
pub struct Chain<T> {
    id: u32,
    /// Arena the nodes live in, fixed by the first append.
    arena: Option<u32>,
    head: Option<SlotHandle>,
    tail: Option<SlotHandle>,
    len: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Chain<T> {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self {
            id: next_instance_id(),
            arena: None,
            head: None,
            tail: None,
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Identity recorded in the nodes this chain links.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Number of linked nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no node is linked.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Handle of the first node.
    #[inline]
    pub fn head(&self) -> Option<SlotHandle> {
        self.head
    }

    /// Handle of the last node.
    #[inline]
    pub fn tail(&self) -> Option<SlotHandle> {
        self.tail
    }

    /// Links `handle` after the current tail.
    ///
    /// The node's own link fields are overwritten, whatever they held. Fails
    /// without touching the chain if the node is already linked somewhere or
    /// does not resolve in `arena`.
    ///
    /// Complexity: O(1).
    pub fn append(
        &mut self,
        arena: &mut Arena<Link<T>>,
        handle: SlotHandle,
    ) -> Result<(), ChainError> {
        let result = self.link_back(arena, handle);
        self.trace_rejection(&result, handle);
        result
    }

    /// Unlinks `handle`, splicing its neighbours together.
    ///
    /// Fails without touching the chain if this chain does not link the node.
    ///
    /// Complexity: O(1).
    pub fn remove(
        &mut self,
        arena: &mut Arena<Link<T>>,
        handle: SlotHandle,
    ) -> Result<(), ChainError> {
        let result = self.unlink(arena, handle);
        self.trace_rejection(&result, handle);
        result
    }

    /// Unlinks `handle` and retires its slot, returning the value.
    ///
    /// Complexity: O(1).
    pub fn retire(
        &mut self,
        arena: &mut Arena<Link<T>>,
        handle: SlotHandle,
    ) -> Result<T, ChainError> {
        self.remove(arena, handle)?;
        let link = arena.retire(handle)?;
        Ok(link.into_value())
    }

    /// Iterates `(position, &value)` pairs from head to tail.
    ///
    /// Nothing beyond what the consumer pulls is visited. An arena other than
    /// the one the chain is bound to yields nothing.
    pub fn iter<'a>(&'a self, arena: &'a Arena<Link<T>>) -> Iter<'a, T> {
        Iter {
            arena,
            walk: self.walk(arena),
            index: 0,
        }
    }

    /// Iterates node handles from head to tail.
    pub fn handles<'a>(&'a self, arena: &'a Arena<Link<T>>) -> Handles<'a, T> {
        Handles {
            arena,
            walk: self.walk(arena),
        }
    }

    fn walk(&self, arena: &Arena<Link<T>>) -> Walk {
        let bound = self.arena == Some(arena.id());
        Walk {
            cursor: if bound { self.head } else { None },
            remaining: if bound { self.len } else { 0 },
        }
    }

    fn link_back(
        &mut self,
        arena: &mut Arena<Link<T>>,
        handle: SlotHandle,
    ) -> Result<(), ChainError> {
        if let Some(bound) = self.arena {
            if arena.id() != bound {
                return Err(ArenaError::Foreign {
                    handle,
                    arena: bound,
                }
                .into());
            }
        }
        if let Some(chain) = arena.try_get(handle)?.owner {
            return Err(ChainError::AlreadyLinked { handle, chain });
        }

        match self.tail {
            Some(tail) => arena.try_get_mut(tail)?.next = Some(handle),
            None => self.head = Some(handle),
        }

        let link = arena.try_get_mut(handle)?;
        link.prev = self.tail;
        link.next = None;
        link.owner = Some(self.id);
        arena.set_pinned(handle, true)?;

        self.arena = Some(arena.id());
        self.tail = Some(handle);
        self.len += 1;
        Ok(())
    }

    fn unlink(&mut self, arena: &mut Arena<Link<T>>, handle: SlotHandle) -> Result<(), ChainError> {
        let link = arena.try_get(handle)?;
        if link.owner != Some(self.id) {
            return Err(ChainError::NotLinked {
                handle,
                chain: self.id,
            });
        }
        let (prev, next) = (link.prev, link.next);

        // Resolve both neighbours before rewriting anything.
        for neighbour in [prev, next].into_iter().flatten() {
            arena.try_get(neighbour)?;
        }

        match prev {
            Some(prev) => arena.try_get_mut(prev)?.next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => arena.try_get_mut(next)?.prev = prev,
            None => self.tail = prev,
        }

        arena.try_get_mut(handle)?.unlink();
        arena.set_pinned(handle, false)?;
        self.len -= 1;
        Ok(())
    }

    #[cfg(feature = "tracing")]
    fn trace_rejection(&self, result: &Result<(), ChainError>, handle: SlotHandle) {
        if let Err(err) = result {
            tracing::debug!(
                chain = self.id,
                handle = %handle,
                reason = err.reason(),
                "chain rejected node"
            );
        }
    }

    #[cfg(not(feature = "tracing"))]
    #[inline(always)]
    fn trace_rejection(&self, _result: &Result<(), ChainError>, _handle: SlotHandle) {}
}

impl<T> Default for Chain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Chain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("id", &self.id)
            .field("arena", &self.arena)
            .field("head", &self.head)
            .field("tail", &self.tail)
            .field("len", &self.len)
            .finish()
    }
}

/// Traversal state shared by [`Iter`] and [`Handles`].
///
/// `remaining` is the number of nodes still ahead of the cursor.
#[derive(Clone, Copy)]
struct Walk {
    cursor: Option<SlotHandle>,
    remaining: usize,
}

impl Walk {
    fn step<'a, T>(&mut self, arena: &'a Arena<Link<T>>) -> Option<(SlotHandle, &'a Link<T>)> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.cursor?;
        let link = arena.get(handle)?;
        self.cursor = link.next;
        self.remaining -= 1;
        Some((handle, link))
    }

    fn done(&mut self) {
        self.remaining = 0;
    }
}

/// Iterator returned by [`Chain::iter`].
pub struct Iter<'a, T> {
    arena: &'a Arena<Link<T>>,
    walk: Walk,
    index: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        match self.walk.step(self.arena) {
            Some((_, link)) => {
                let index = self.index;
                self.index += 1;
                Some((index, &link.value))
            }
            None => {
                self.walk.done();
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.walk.remaining, Some(self.walk.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Iterator returned by [`Chain::handles`].
pub struct Handles<'a, T> {
    arena: &'a Arena<Link<T>>,
    walk: Walk,
}

impl<T> Iterator for Handles<'_, T> {
    type Item = SlotHandle;

    fn next(&mut self) -> Option<Self::Item> {
        match self.walk.step(self.arena) {
            Some((handle, _)) => Some(handle),
            None => {
                self.walk.done();
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.walk.remaining, Some(self.walk.remaining))
    }
}

impl<T> ExactSizeIterator for Handles<'_, T> {}
impl<T> FusedIterator for Handles<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(values: &[i32]) -> (Arena<Link<i32>>, Chain<i32>, Vec<SlotHandle>) {
        let mut arena = Arena::new();
        let mut chain = Chain::new();
        let handles = values
            .iter()
            .map(|&v| {
                let h = arena.alloc(Link::new(v));
                chain.append(&mut arena, h).unwrap();
                h
            })
            .collect();
        (arena, chain, handles)
    }

    fn collect(chain: &Chain<i32>, arena: &Arena<Link<i32>>) -> Vec<i32> {
        chain.iter(arena).map(|(_, v)| *v).collect()
    }

    #[test]
    fn test_append_tracks_head_and_tail() {
        let (arena, chain, hs) = filled(&[1, 2, 3]);
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.head(), Some(hs[0]));
        assert_eq!(chain.tail(), Some(hs[2]));
        assert_eq!(arena.get(hs[1]).unwrap().prev(), Some(hs[0]));
        assert_eq!(arena.get(hs[1]).unwrap().next(), Some(hs[2]));
        assert_eq!(collect(&chain, &arena), vec![1, 2, 3]);
    }

    #[test]
    fn test_remove_head_middle_tail() {
        let (mut arena, mut chain, hs) = filled(&[1, 2, 3, 4, 5]);

        chain.remove(&mut arena, hs[2]).unwrap();
        assert_eq!(collect(&chain, &arena), vec![1, 2, 4, 5]);

        chain.remove(&mut arena, hs[0]).unwrap();
        assert_eq!(chain.head(), Some(hs[1]));
        assert_eq!(arena.get(hs[1]).unwrap().prev(), None);

        chain.remove(&mut arena, hs[4]).unwrap();
        assert_eq!(chain.tail(), Some(hs[3]));
        assert_eq!(arena.get(hs[3]).unwrap().next(), None);

        assert_eq!(collect(&chain, &arena), vec![2, 4]);
        assert_eq!(chain.len(), 2);
        assert!(!arena.get(hs[2]).unwrap().is_linked());
    }

    #[test]
    fn test_remove_last_node_empties_chain() {
        let (mut arena, mut chain, hs) = filled(&[7]);
        chain.remove(&mut arena, hs[0]).unwrap();
        assert!(chain.is_empty());
        assert_eq!(chain.head(), None);
        assert_eq!(chain.tail(), None);
        assert_eq!(chain.iter(&arena).count(), 0);
    }

    #[test]
    fn test_double_remove_is_reported() {
        let (mut arena, mut chain, hs) = filled(&[1, 2]);
        chain.remove(&mut arena, hs[0]).unwrap();

        let err = chain.remove(&mut arena, hs[0]).unwrap_err();
        assert_eq!(
            err,
            ChainError::NotLinked {
                handle: hs[0],
                chain: chain.id()
            }
        );
        assert_eq!(chain.len(), 1);
        assert_eq!(collect(&chain, &arena), vec![2]);
    }

    #[test]
    fn test_remove_from_other_chain_is_reported() {
        let mut arena = Arena::new();
        let mut left = Chain::new();
        let mut right = Chain::new();
        let a = arena.alloc(Link::new(1));
        let b = arena.alloc(Link::new(2));
        left.append(&mut arena, a).unwrap();
        right.append(&mut arena, b).unwrap();

        assert!(matches!(
            left.remove(&mut arena, b),
            Err(ChainError::NotLinked { .. })
        ));
        assert_eq!(left.len(), 1);
        assert_eq!(right.len(), 1);
        assert_eq!(arena.get(b).unwrap().owner(), Some(right.id()));
    }

    #[test]
    fn test_append_linked_node_is_reported() {
        let (mut arena, mut chain, hs) = filled(&[1, 2]);
        let mut other = Chain::new();

        assert_eq!(
            chain.append(&mut arena, hs[0]),
            Err(ChainError::AlreadyLinked {
                handle: hs[0],
                chain: chain.id()
            })
        );
        assert!(other.append(&mut arena, hs[1]).is_err());
        assert_eq!(chain.len(), 2);
        assert!(other.is_empty());
    }

    #[test]
    fn test_append_clears_stale_links() {
        let mut arena = Arena::new();
        let mut chain = Chain::new();
        let stray = arena.alloc(Link::new(99));
        let a = arena.alloc(Link::new(1));
        arena.get_mut(a).unwrap().next = Some(stray);
        arena.get_mut(a).unwrap().prev = Some(stray);

        chain.append(&mut arena, a).unwrap();

        let link = arena.get(a).unwrap();
        assert_eq!(link.next(), None);
        assert_eq!(link.prev(), None);
        assert_eq!(collect(&chain, &arena), vec![1]);
    }

    #[test]
    fn test_relink_after_remove_moves_to_tail() {
        let (mut arena, mut chain, hs) = filled(&[1, 2, 3]);
        chain.remove(&mut arena, hs[0]).unwrap();
        chain.append(&mut arena, hs[0]).unwrap();
        assert_eq!(collect(&chain, &arena), vec![2, 3, 1]);
    }

    #[test]
    fn test_iter_stops_early() {
        let (arena, chain, _) = filled(&[10, 20, 30]);
        let mut visited = Vec::new();
        for (i, v) in chain.iter(&arena) {
            visited.push((i, *v));
            break;
        }
        assert_eq!(visited, vec![(0, 10)]);
    }

    #[test]
    fn test_iter_is_restartable() {
        let (arena, chain, hs) = filled(&[10, 20, 30]);
        let first: Vec<_> = chain.iter(&arena).map(|(i, v)| (i, *v)).collect();
        let second: Vec<_> = chain.iter(&arena).map(|(i, v)| (i, *v)).collect();
        assert_eq!(first, vec![(0, 10), (1, 20), (2, 30)]);
        assert_eq!(first, second);
        assert_eq!(chain.handles(&arena).collect::<Vec<_>>(), hs);
    }

    #[test]
    fn test_foreign_and_stale_nodes() {
        let (mut arena, mut chain, hs) = filled(&[1]);
        let mut elsewhere = Arena::new();
        let foreign = elsewhere.alloc(Link::new(5));

        assert!(matches!(
            chain.append(&mut elsewhere, foreign),
            Err(ChainError::Arena(ArenaError::Foreign { .. }))
        ));

        chain.remove(&mut arena, hs[0]).unwrap();
        arena.retire(hs[0]).unwrap();
        assert!(matches!(
            chain.append(&mut arena, hs[0]),
            Err(ChainError::Arena(ArenaError::Stale { .. }))
        ));
        assert!(chain.is_empty());
    }
    #[test]
    fn test_arena_refuses_to_retire_linked_node() {
        let (mut arena, mut chain, hs) = filled(&[1, 2, 3]);

        assert_eq!(
            arena.retire(hs[1]).map(Link::into_value),
            Err(ArenaError::Pinned { handle: hs[1] })
        );
        assert_eq!(chain.len(), 3);
        assert_eq!(collect(&chain, &arena), vec![1, 2, 3]);

        chain.remove(&mut arena, hs[2]).unwrap();
        chain.remove(&mut arena, hs[0]).unwrap();
        chain.remove(&mut arena, hs[1]).unwrap();
        assert!(chain.is_empty());
        assert_eq!(arena.retire(hs[1]).map(Link::into_value), Ok(2));
    }

    #[test]
    fn test_retire_unlinks_then_frees_value() {
        let (mut arena, mut chain, hs) = filled(&[1, 2, 3]);

        assert_eq!(chain.retire(&mut arena, hs[1]), Ok(2));
        assert_eq!(chain.len(), 2);
        assert_eq!(collect(&chain, &arena), vec![1, 3]);
        assert_eq!(arena.get(hs[0]).unwrap().next(), Some(hs[2]));
        assert_eq!(arena.get(hs[2]).unwrap().prev(), Some(hs[0]));
        assert!(!arena.contains(hs[1]));

        assert!(matches!(
            chain.retire(&mut arena, hs[1]),
            Err(ChainError::Arena(ArenaError::Stale { .. }))
        ));
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_retire_unlinked_node_is_reported() {
        let (mut arena, mut chain, _) = filled(&[1]);
        let loose = arena.alloc(Link::new(9));

        assert!(matches!(
            chain.retire(&mut arena, loose),
            Err(ChainError::NotLinked { .. })
        ));
        assert!(arena.contains(loose));
    }

    #[test]
    fn test_append_from_second_arena_is_rejected() {
        let (mut arena, mut chain, _) = filled(&[1]);
        let mut second = Arena::new();
        let stray = second.alloc(Link::new(2));

        let err = chain.append(&mut second, stray).unwrap_err();
        assert_eq!(err.reason(), "foreign");
        assert!(!second.is_pinned(stray));
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.iter(&second).count(), 0);

        let local = arena.alloc(Link::new(3));
        chain.append(&mut arena, local).unwrap();
        assert_eq!(collect(&chain, &arena), vec![1, 3]);
    }

    #[test]
    fn test_iter_reports_exact_length() {
        let (mut arena, mut chain, hs) = filled(&[1, 2, 3, 4]);
        let mut iter = chain.iter(&arena);
        assert_eq!(iter.len(), 4);
        iter.next();
        assert_eq!(iter.size_hint(), (3, Some(3)));

        chain.remove(&mut arena, hs[0]).unwrap();
        assert_eq!(chain.handles(&arena).len(), 3);
        assert_eq!(chain.iter(&Arena::new()).len(), 0);
    }
}
