//! Growable candidate lists for one inference pass
//!
//! While inference runs, an unresolved type keeps gaining candidates. That
//! growth lives here, in an arena owned by the pass. [`UnresolvedArena::finish`]
//! freezes a list into an immutable `LoclKind::Unresolved` type; finalized
//! types never grow.

use crate::reason::Reason;
use crate::ty::{push_candidate, Locl, Ty};
use std::fmt;
use tracing::trace;

/// Handle to a candidate list in an [`UnresolvedArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnresolvedId(u32);

impl fmt::Display for UnresolvedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnresolvedId({})", self.0)
    }
}

#[derive(Debug, Clone)]
struct Slot {
    reason: Reason,
    candidates: Vec<Ty<Locl>>,
}

/// Candidate lists being grown by one inference pass
#[derive(Debug, Clone, Default)]
pub struct UnresolvedArena {
    slots: Vec<Slot>,
}

impl UnresolvedArena {
    /// An empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an empty candidate list
    pub fn alloc(&mut self, reason: Reason) -> UnresolvedId {
        let id = UnresolvedId(self.slots.len() as u32);
        self.slots.push(Slot {
            reason,
            candidates: Vec::new(),
        });
        id
    }

    /// Append a candidate unless a structurally equal one is already present.
    ///
    /// Returns false for a duplicate or an id from another arena.
    pub fn add(&mut self, id: UnresolvedId, ty: Ty<Locl>) -> bool {
        let Some(slot) = self.slots.get_mut(id.0 as usize) else {
            return false;
        };
        let added = push_candidate(&mut slot.candidates, ty);
        trace!(%id, added, count = slot.candidates.len(), "unresolved candidate");
        added
    }

    /// Current candidates of `id`
    pub fn candidates(&self, id: UnresolvedId) -> Option<&[Ty<Locl>]> {
        self.slots
            .get(id.0 as usize)
            .map(|slot| slot.candidates.as_slice())
    }

    /// Freeze the current candidates into an immutable local type
    pub fn finish(&self, id: UnresolvedId) -> Option<Ty<Locl>> {
        let slot = self.slots.get(id.0 as usize)?;
        Some(Ty::unresolved(slot.reason.clone(), slot.candidates.iter().cloned()))
    }

    /// Number of lists allocated
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether nothing was allocated
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
