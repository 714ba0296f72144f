//! Scratch restore points.
//!
//! An [`ArenaMark`] records the arena's bump position so that every
//! allocation made after it can be rolled back in one step. Marks nest:
//! popping a mark invalidates every mark taken after it, while the popped
//! mark itself stays valid and can be popped again.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;

static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(1);

/// Hand out a process-unique arena identity.
pub(crate) fn next_arena_id() -> u64 {
    NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed)
}

/// A saved `(region, cursor)` position in an [`Arena`](crate::Arena).
///
/// Marks are plain values with no lifecycle of their own. A mark is valid
/// until [`Arena::reset`](crate::Arena::reset) runs, or until a mark taken
/// before it is popped. [`ArenaMark::UNSET`] is always accepted and
/// rolls the arena back to empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[must_use]
pub struct ArenaMark {
    target: Option<MarkTarget>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct MarkTarget {
    /// Identity of the arena the mark was taken on.
    pub(crate) arena: u64,
    /// Position in that arena's open-mark stack.
    pub(crate) serial: u64,
    /// Chain index of the region that was `end` at mark time.
    pub(crate) region: usize,
    /// That region's cursor in words at mark time.
    pub(crate) count: usize,
}

impl ArenaMark {
    /// A mark that refers to no position. Popping it resets the arena.
    pub const UNSET: Self = Self { target: None };

    pub(crate) fn new(arena: u64, serial: u64, region: usize, count: usize) -> Self {
        Self {
            target: Some(MarkTarget {
                arena,
                serial,
                region,
                count,
            }),
        }
    }

    pub(crate) fn target(&self) -> Option<MarkTarget> {
        self.target
    }

    /// Whether this mark refers to a position.
    pub fn is_set(&self) -> bool {
        self.target.is_some()
    }

    /// Chain index of the marked region, if set.
    pub fn region(&self) -> Option<usize> {
        self.target.map(|t| t.region)
    }

    /// Cursor of the marked region in words at mark time (zero if unset).
    pub fn count(&self) -> usize {
        self.target.map_or(0, |t| t.count)
    }
}

impl fmt::Display for ArenaMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            Some(t) => write!(
                f,
                "ArenaMark(region={}, count={}, serial={})",
                t.region, t.count, t.serial
            ),
            None => write!(f, "ArenaMark(unset)"),
        }
    }
}

/// Stack of marks that are still valid on one arena.
///
/// Serials are strictly increasing, so the stack is always sorted. The
/// depth is bounded by mark nesting: a mark taken at the position already
/// recorded on top of the stack reuses that entry.
#[derive(Debug, Default)]
pub(crate) struct MarkStack {
    open: SmallVec<[OpenMark; 8]>,
    next_serial: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpenMark {
    serial: u64,
    region: usize,
    count: usize,
}

impl MarkStack {
    /// Register a mark at `(region, count)` and return its serial.
    pub(crate) fn push(&mut self, region: usize, count: usize) -> u64 {
        if let Some(top) = self.open.last() {
            if top.region == region && top.count == count {
                return top.serial;
            }
        }
        let serial = self.next_serial;
        self.next_serial += 1;
        self.open.push(OpenMark {
            serial,
            region,
            count,
        });
        serial
    }

    /// Invalidate every mark taken after `serial`, keeping `serial` itself.
    ///
    /// Returns `false` if `serial` is not a valid mark.
    pub(crate) fn truncate_after(&mut self, serial: u64) -> bool {
        match self.open.binary_search_by_key(&serial, |m| m.serial) {
            Ok(pos) => {
                self.open.truncate(pos + 1);
                true
            }
            Err(_) => false,
        }
    }

    /// Invalidate every mark.
    pub(crate) fn clear(&mut self) {
        self.open.clear();
    }

    /// Number of valid marks.
    pub(crate) fn len(&self) -> usize {
        self.open.len()
    }
}
