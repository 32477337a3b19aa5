//! Error types for arena and chain operations.
//!
//! Both enums carry the offending [`SlotHandle`] so callers can log or match on
//! exactly which node was rejected.

use crate::alloc::SlotHandle;
use thiserror::Error;

/// A handle could not be resolved against an [`Arena`](crate::alloc::Arena).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArenaError {
    /// The handle was issued by a different arena.
    #[error("{handle} was not issued by arena {arena}")]
    Foreign {
        /// The rejected handle.
        handle: SlotHandle,
        /// Identity of the arena it was presented to.
        arena: u32,
    },
    /// The slot behind the handle has been retired.
    #[error("{handle} is stale, slot is at generation {current}")]
    Stale {
        /// The rejected handle.
        handle: SlotHandle,
        /// Generation the slot is at now.
        current: u32,
    },
    /// The slot is held by a chain and cannot be retired until it is unlinked.
    #[error("{handle} is still linked into a chain")]
    Pinned {
        /// The rejected handle.
        handle: SlotHandle,
    },
}

impl ArenaError {
    /// The handle that failed to resolve.
    pub fn handle(&self) -> SlotHandle {
        match *self {
            Self::Foreign { handle, .. }
            | Self::Stale { handle, .. }
            | Self::Pinned { handle } => handle,
        }
    }
}

/// A chain refused to link or unlink a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The node's handle did not resolve in the arena passed alongside the chain.
    #[error(transparent)]
    Arena(#[from] ArenaError),
    /// `append` was given a node that some chain already links.
    #[error("{handle} is already linked into chain {chain}")]
    AlreadyLinked {
        /// The rejected handle.
        handle: SlotHandle,
        /// Identity of the chain that owns the node.
        chain: u32,
    },
    /// `remove` was given a node this chain does not link.
    #[error("{handle} is not linked into chain {chain}")]
    NotLinked {
        /// The rejected handle.
        handle: SlotHandle,
        /// Identity of the chain the removal was attempted on.
        chain: u32,
    },
}

impl ChainError {
    /// Short machine-friendly label, used as a structured log field.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Arena(ArenaError::Foreign { .. }) => "foreign",
            Self::Arena(ArenaError::Stale { .. }) => "stale",
            Self::Arena(ArenaError::Pinned { .. }) => "pinned",
            Self::AlreadyLinked { .. } => "already_linked",
            Self::NotLinked { .. } => "not_linked",
        }
    }
}
