//! The region-chained bump arena.
//!
//! An [`Arena`] presents one logical allocator backed by a forward-only,
//! append-only chain of [`Region`]s. Allocation walks forward from the
//! region that served the previous request and appends a new region when
//! the chain is exhausted, so pointers already handed out never move.
//!
//! Reclamation is coarse: [`Arena::reset`] releases everything, and
//! [`Arena::pop_scratch`] releases everything allocated since an
//! [`ArenaMark`]. Region memory is retained for reuse in both cases and is
//! returned to the system only when the arena is destroyed or dropped.

use std::alloc::Layout;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::mem::MaybeUninit;
use std::ptr::NonNull;

use tracing::{debug, error, warn};

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::mark::{self, ArenaMark, MarkStack};
use crate::raw::{self, WORD};
use crate::region::Region;
use crate::stats::{ArenaStats, RegionStats};

/// A growable chain of bump-allocated regions with scratch marks.
///
/// Allocation takes `&self`, so any number of allocations can be live at
/// once. Reclamation ([`reset`](Self::reset), [`pop_scratch`](Self::pop_scratch))
/// takes `&mut self`, so references returned by the typed allocation methods
/// cannot outlive the memory they point to. Raw pointers from
/// [`alloc_raw`](Self::alloc_raw) carry no such guarantee and are valid only
/// until the next reclamation.
///
/// The arena is single-owner: it is `Send` but not `Sync`. Share it across
/// threads behind a lock, or give each thread its own arena.
///
/// Values placed in the arena never have their destructors run.
pub struct Arena {
    /// Region chain. Index 0 is the chain head; regions are only appended.
    regions: RefCell<Vec<Region>>,
    /// Index of the region that served the most recent allocation.
    end: Cell<usize>,
    /// Marks that are still valid on this arena.
    marks: RefCell<MarkStack>,
    /// Process-unique identity, used to reject foreign marks.
    id: u64,
    config: ArenaConfig,
}

impl Arena {
    /// Create an arena whose first region holds `size_bytes`, rounded up to
    /// whole words, using the default growth policy.
    ///
    /// Returns `Err(ArenaError::OutOfMemory)` if the first region cannot be
    /// allocated.
    pub fn new(size_bytes: usize) -> Result<Self, ArenaError> {
        Self::with_config(ArenaConfig::new(size_bytes))
    }

    /// Create an arena from an explicit configuration.
    ///
    /// Returns `Err(ArenaError::InvalidConfig)` if the config fails
    /// validation, or `Err(ArenaError::OutOfMemory)` if the first region
    /// cannot be allocated.
    pub fn with_config(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        let first = Region::new(config.initial_bytes)?;
        let id = mark::next_arena_id();
        debug!(
            arena = id,
            capacity_bytes = first.capacity_bytes(),
            growth = ?config.growth,
            "arena created"
        );
        Ok(Self {
            regions: RefCell::new(vec![first]),
            end: Cell::new(0),
            marks: RefCell::new(MarkStack::default()),
            id,
            config,
        })
    }

    /// Bump-allocate `size_bytes`, rounded up to whole words.
    ///
    /// The returned memory is word-aligned and uninitialised. If no region
    /// from the current one onwards has room, a new region sized by the
    /// growth policy is appended; there is no size limit beyond what the
    /// system allocator can provide.
    ///
    /// Returns `Err(ArenaError::OutOfMemory)` only if a new region cannot be
    /// allocated. The arena is unchanged in that case.
    pub fn alloc_raw(&self, size_bytes: usize) -> Result<NonNull<u8>, ArenaError> {
        let words = raw::words_for(size_bytes).ok_or(ArenaError::OutOfMemory {
            requested: size_bytes,
        })?;
        self.alloc_words(words)
    }

    fn alloc_words(&self, words: usize) -> Result<NonNull<u8>, ArenaError> {
        let mut regions = self.regions.borrow_mut();
        let mut index = self.end.get();
        loop {
            match regions[index].allocate_words(words) {
                Ok(ptr) => {
                    self.end.set(index);
                    return Ok(ptr);
                }
                // Region full: move on to the next region or grow the chain.
                Err(ArenaError::OutOfCapacity { .. }) => {}
                Err(e) => return Err(e),
            }
            if index + 1 == regions.len() {
                let region = self.grow(regions[index].capacity(), words, index + 1)?;
                regions.push(region);
            }
            index += 1;
        }
    }

    /// Allocate the region appended at chain position `index`.
    fn grow(
        &self,
        prev_words: usize,
        request_words: usize,
        index: usize,
    ) -> Result<Region, ArenaError> {
        let words = self.config.growth.next_capacity(prev_words, request_words);
        match Region::with_words(words) {
            Ok(region) => {
                debug!(
                    arena = self.id,
                    region = index,
                    capacity_bytes = region.capacity_bytes(),
                    "arena grew region chain"
                );
                Ok(region)
            }
            Err(e) => {
                warn!(arena = self.id, region = index, error = %e, "arena growth failed");
                Err(e)
            }
        }
    }

    /// Allocate memory satisfying `layout`.
    ///
    /// Alignments up to [`WORD`] come for free. Larger alignments are served
    /// by over-reserving `align - WORD` bytes and advancing the pointer.
    pub fn alloc_layout(&self, layout: Layout) -> Result<NonNull<u8>, ArenaError> {
        if layout.align() <= WORD {
            return self.alloc_raw(layout.size());
        }
        let padded = layout
            .size()
            .checked_add(layout.align() - WORD)
            .ok_or(ArenaError::OutOfMemory {
                requested: layout.size(),
            })?;
        let ptr = self.alloc_raw(padded)?;
        Ok(raw::align_up(ptr, layout.align()))
    }

    /// Reserve uninitialised, correctly aligned space for one `T`.
    #[allow(unsafe_code)]
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_uninit<T>(&self) -> Result<&mut MaybeUninit<T>, ArenaError> {
        let ptr = self.alloc_layout(Layout::new::<T>())?;
        // SAFETY: `ptr` is a fresh allocation of `size_of::<T>()` bytes aligned
        // for `T`, disjoint from every other allocation. Its memory stays
        // reserved until `&mut self` is taken for reset/pop/destroy, which the
        // returned borrow of `self` prevents.
        Ok(unsafe { &mut *ptr.as_ptr().cast::<MaybeUninit<T>>() })
    }

    /// Move `value` into the arena and return a reference to it.
    ///
    /// `value`'s destructor will never run.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc<T>(&self, value: T) -> Result<&mut T, ArenaError> {
        Ok(self.alloc_uninit::<T>()?.write(value))
    }

    /// Reserve uninitialised, correctly aligned space for `len` values of `T`.
    #[allow(unsafe_code)]
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice_uninit<T>(&self, len: usize) -> Result<&mut [MaybeUninit<T>], ArenaError> {
        let layout = Layout::array::<T>(len).map_err(|_| ArenaError::OutOfMemory {
            requested: len.saturating_mul(std::mem::size_of::<T>()),
        })?;
        let ptr = self.alloc_layout(layout)?;
        // SAFETY: as in `alloc_uninit`; `ptr` covers `len * size_of::<T>()`
        // bytes aligned for `T`, and `MaybeUninit` needs no initialisation.
        Ok(unsafe { std::slice::from_raw_parts_mut(ptr.as_ptr().cast::<MaybeUninit<T>>(), len) })
    }

    /// Copy `src` into the arena.
    #[allow(unsafe_code)]
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice_copy<T: Copy>(&self, src: &[T]) -> Result<&mut [T], ArenaError> {
        let dst = self.alloc_slice_uninit::<T>(src.len())?;
        for (slot, value) in dst.iter_mut().zip(src) {
            slot.write(*value);
        }
        // SAFETY: every element of `dst` was initialised by the loop above,
        // and `MaybeUninit<T>` has the same layout as `T`.
        Ok(unsafe { &mut *(dst as *mut [MaybeUninit<T>] as *mut [T]) })
    }

    /// Allocate `len` copies of `value`.
    ///
    /// Use this when the caller needs initialised memory, e.g. a zeroed
    /// buffer to read into.
    #[allow(unsafe_code)]
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice_fill<T: Copy>(&self, len: usize, value: T) -> Result<&mut [T], ArenaError> {
        let dst = self.alloc_slice_uninit::<T>(len)?;
        for slot in dst.iter_mut() {
            slot.write(value);
        }
        // SAFETY: every element of `dst` was initialised by the loop above.
        Ok(unsafe { &mut *(dst as *mut [MaybeUninit<T>] as *mut [T]) })
    }

    /// Copy a string into the arena.
    #[allow(unsafe_code)]
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_str(&self, src: &str) -> Result<&mut str, ArenaError> {
        let bytes = self.alloc_slice_copy(src.as_bytes())?;
        // SAFETY: `bytes` is a byte-for-byte copy of a valid `str`.
        Ok(unsafe { std::str::from_utf8_unchecked_mut(bytes) })
    }

    /// Reset every region and rewind to the chain head.
    ///
    /// All allocations and all marks become invalid. Every region is kept
    /// for reuse. Calling `reset` twice is the same as calling it once.
    pub fn reset(&mut self) {
        for region in self.regions.get_mut().iter_mut() {
            region.reset();
        }
        self.end.set(0);
        self.marks.get_mut().clear();
        debug!(arena = self.id, regions = self.region_count(), "arena reset");
    }

    /// Capture the current bump position.
    ///
    /// The mark stays valid until [`reset`](Self::reset), or until a mark
    /// taken before it is popped. Marks taken at an unchanged position share
    /// one bookkeeping entry, so balanced mark/pop cycles use constant space.
    pub fn scratch_mark(&self) -> ArenaMark {
        let end = self.end.get();
        let count = self.regions.borrow()[end].used();
        let serial = self.marks.borrow_mut().push(end, count);
        ArenaMark::new(self.id, serial, end, count)
    }

    /// Roll the arena back to `mark`.
    ///
    /// The marked region's cursor returns to its value at mark time, every
    /// region after it is reset, and allocation resumes from the marked
    /// region. Every region stays linked for reuse. An unset mark resets the
    /// whole arena.
    ///
    /// `mark` stays valid and may be popped again; marks taken after it
    /// become invalid.
    ///
    /// # Panics
    ///
    /// Panics if `mark` was invalidated by a reset or by popping an earlier
    /// mark, or if it was taken on a different arena. Either is a caller bug
    /// that would otherwise corrupt the allocation state.
    pub fn pop_scratch(&mut self, mark: ArenaMark) {
        let Some(target) = mark.target() else {
            self.reset();
            return;
        };

        if target.arena != self.id {
            error!(arena = self.id, %mark, "pop_scratch with a mark from another arena");
            panic!("pop_scratch: {mark} belongs to arena {}, not {}", target.arena, self.id);
        }
        if !self.marks.get_mut().truncate_after(target.serial) {
            error!(arena = self.id, %mark, "pop_scratch with an invalidated mark");
            panic!("pop_scratch: {mark} was invalidated by a reset or an earlier pop");
        }

        let regions = self.regions.get_mut();
        regions[target.region].rewind(target.count);
        for region in &mut regions[target.region + 1..] {
            region.reset();
        }
        self.end.set(target.region);
        debug!(arena = self.id, %mark, "arena popped to scratch mark");
    }

    /// Run `f` between a scratch mark and its pop.
    ///
    /// Everything `f` allocates is released when it returns. The result
    /// cannot borrow from the arena.
    pub fn with_scratch<R>(&mut self, f: impl FnOnce(&Self) -> R) -> R {
        let mark = self.scratch_mark();
        let result = f(self);
        self.pop_scratch(mark);
        result
    }

    /// Release every region back to the system.
    ///
    /// Dropping the arena does the same; this method only adds a log line
    /// with the final usage. Consuming `self` rules out use after destroy.
    pub fn destroy(self) {
        debug!(arena = self.id, stats = %self.stats(), "arena destroyed");
    }

    /// Usage totals across the chain.
    pub fn stats(&self) -> ArenaStats {
        ArenaStats::from_regions(&self.region_stats())
    }

    /// Per-region usage, in chain order.
    pub fn region_stats(&self) -> Vec<RegionStats> {
        self.regions
            .borrow()
            .iter()
            .map(|r| RegionStats {
                used_bytes: r.used_bytes(),
                capacity_bytes: r.capacity_bytes(),
            })
            .collect()
    }

    /// Number of regions in the chain.
    pub fn region_count(&self) -> usize {
        self.regions.borrow().len()
    }

    /// Chain index of the region that will be tried first by the next
    /// allocation.
    pub fn current_region(&self) -> usize {
        self.end.get()
    }

    /// Chain index of the region whose buffer contains `ptr`, if any.
    pub fn region_containing(&self, ptr: *const u8) -> Option<usize> {
        self.regions.borrow().iter().position(|r| r.contains(ptr))
    }

    /// Number of marks that are still valid.
    pub fn open_marks(&self) -> usize {
        self.marks.borrow().len()
    }

    /// The configuration this arena was built with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("id", &self.id)
            .field("regions", &*self.regions.borrow())
            .field("end", &self.end.get())
            .field("growth", &self.config.growth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GrowthPolicy;
    use proptest::prelude::*;

    fn used_words(arena: &Arena) -> Vec<usize> {
        arena
            .region_stats()
            .iter()
            .map(|r| r.used_bytes / WORD)
            .collect()
    }

    #[test]
    fn new_arena_has_one_empty_region() {
        let arena = Arena::new(WORD * 8).unwrap();
        assert_eq!(arena.region_count(), 1);
        assert_eq!(arena.current_region(), 0);
        assert_eq!(
            arena.stats(),
            ArenaStats {
                used_bytes: 0,
                reserved_bytes: WORD * 8,
                region_count: 1,
            }
        );
    }

    #[test]
    fn with_config_rejects_invalid_growth() {
        let config = ArenaConfig::new(64).with_growth(GrowthPolicy::Multiply { factor: 0 });
        assert!(matches!(
            Arena::with_config(config),
            Err(ArenaError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn alloc_within_first_region_does_not_grow() {
        let arena = Arena::new(WORD * 8).unwrap();
        let a = arena.alloc_raw(WORD * 3).unwrap();
        let b = arena.alloc_raw(WORD * 5).unwrap();
        assert_eq!(arena.region_count(), 1);
        assert_eq!(arena.region_containing(a.as_ptr()), Some(0));
        assert_eq!(arena.region_containing(b.as_ptr()), Some(0));
        assert_eq!(used_words(&arena), vec![8]);
    }

    #[test]
    fn overflow_appends_region_matching_previous() {
        let arena = Arena::new(WORD * 8).unwrap();
        arena.alloc_raw(WORD * 6).unwrap();
        let p = arena.alloc_raw(WORD * 4).unwrap();
        assert_eq!(arena.region_count(), 2);
        assert_eq!(arena.current_region(), 1);
        assert_eq!(arena.region_containing(p.as_ptr()), Some(1));
        assert_eq!(arena.region_stats()[1].capacity_bytes, WORD * 8);
    }

    #[test]
    fn oversized_request_gets_exact_region() {
        let arena = Arena::new(WORD * 8).unwrap();
        arena.alloc_raw(WORD * 100).unwrap();
        assert_eq!(arena.region_count(), 2);
        assert_eq!(arena.region_stats()[1].capacity_bytes, WORD * 100);
        assert_eq!(used_words(&arena), vec![0, 100]);
    }

    #[test]
    fn allocation_never_searches_backwards() {
        let arena = Arena::new(WORD * 8).unwrap();
        arena.alloc_raw(WORD * 6).unwrap();
        arena.alloc_raw(WORD * 8).unwrap(); // region 1, full
        // Region 0 still has two free words but `end` is past it.
        arena.alloc_raw(WORD).unwrap();
        assert_eq!(arena.region_count(), 3);
        assert_eq!(used_words(&arena), vec![6, 8, 1]);
    }

    #[test]
    fn fixed_growth_uses_increment() {
        let config = ArenaConfig::new(WORD * 4).with_growth(GrowthPolicy::Fixed { bytes: WORD * 32 });
        let arena = Arena::with_config(config).unwrap();
        arena.alloc_raw(WORD * 5).unwrap();
        assert_eq!(arena.region_stats()[1].capacity_bytes, WORD * 32);
    }

    #[test]
    fn multiply_growth_scales_previous_region() {
        let config = ArenaConfig::new(WORD * 4).with_growth(GrowthPolicy::Multiply { factor: 3 });
        let arena = Arena::with_config(config).unwrap();
        arena.alloc_raw(WORD * 4).unwrap();
        arena.alloc_raw(WORD).unwrap();
        arena.alloc_raw(WORD * 12).unwrap();
        let caps: Vec<usize> = arena
            .region_stats()
            .iter()
            .map(|r| r.capacity_bytes / WORD)
            .collect();
        assert_eq!(caps, vec![4, 12, 36]);
    }

    #[test]
    fn zero_budget_arena_grows_on_first_alloc() {
        let arena = Arena::new(0).unwrap();
        arena.alloc_raw(WORD * 2).unwrap();
        assert_eq!(arena.region_count(), 2);
        assert_eq!(arena.region_stats()[1].capacity_bytes, WORD * 2);
    }

    #[test]
    fn over_aligned_layout_is_honoured() {
        #[repr(align(64))]
        struct Line([u8; 64]);

        let arena = Arena::new(1024).unwrap();
        arena.alloc_raw(1).unwrap();
        let line = arena.alloc(Line([7; 64])).unwrap();
        assert_eq!(&*line as *const Line as usize % 64, 0);
        assert_eq!(line.0[63], 7);
    }

    #[test]
    fn typed_values_are_disjoint() {
        let arena = Arena::new(256).unwrap();
        let a = arena.alloc(1u64).unwrap();
        let b = arena.alloc(2u64).unwrap();
        *a += 10;
        assert_eq!(*a, 11);
        assert_eq!(*b, 2);
    }

    #[test]
    fn slice_and_str_copies() {
        let arena = Arena::new(256).unwrap();
        let nums = arena.alloc_slice_copy(&[1u32, 2, 3]).unwrap();
        nums[1] = 20;
        assert_eq!(nums, &[1, 20, 3]);
        let s = arena.alloc_str("spirv").unwrap();
        assert_eq!(s, "spirv");
        let empty = arena.alloc_slice_uninit::<u16>(0).unwrap();
        assert!(empty.is_empty());
        let zeroed = arena.alloc_slice_fill(5, 0u8).unwrap();
        assert_eq!(zeroed, &[0; 5]);
    }

    #[test]
    fn reset_rewinds_all_regions_and_keeps_memory() {
        let mut arena = Arena::new(WORD * 4).unwrap();
        arena.alloc_raw(WORD * 4).unwrap();
        arena.alloc_raw(WORD * 4).unwrap();
        let reserved = arena.stats().reserved_bytes;
        arena.reset();
        assert_eq!(used_words(&arena), vec![0, 0]);
        assert_eq!(arena.current_region(), 0);
        assert_eq!(arena.stats().reserved_bytes, reserved);
    }

    #[test]
    fn reset_reuses_existing_regions_before_growing() {
        let mut arena = Arena::new(WORD * 4).unwrap();
        arena.alloc_raw(WORD * 4).unwrap();
        arena.alloc_raw(WORD * 4).unwrap();
        arena.reset();
        arena.alloc_raw(WORD * 4).unwrap();
        arena.alloc_raw(WORD * 4).unwrap();
        assert_eq!(arena.region_count(), 2);
    }

    #[test]
    fn pop_scratch_releases_only_later_allocations() {
        let mut arena = Arena::new(WORD * 8).unwrap();
        arena.alloc_raw(WORD * 2).unwrap();
        let mark = arena.scratch_mark();
        assert_eq!(mark.region(), Some(0));
        assert_eq!(mark.count(), 2);
        arena.alloc_raw(WORD * 5).unwrap();
        arena.alloc_raw(WORD * 9).unwrap();
        assert_eq!(arena.region_count(), 2);
        arena.pop_scratch(mark);
        assert_eq!(used_words(&arena), vec![2, 0]);
        assert_eq!(arena.current_region(), 0);
    }

    #[test]
    fn unset_mark_pops_to_empty() {
        let mut arena = Arena::new(WORD * 8).unwrap();
        arena.alloc_raw(WORD * 3).unwrap();
        arena.pop_scratch(ArenaMark::UNSET);
        assert_eq!(arena.stats().used_bytes, 0);
    }

    #[test]
    fn mark_can_be_popped_repeatedly() {
        let mut arena = Arena::new(WORD * 8).unwrap();
        let mark = arena.scratch_mark();
        arena.alloc_raw(WORD).unwrap();
        arena.pop_scratch(mark);
        arena.alloc_raw(WORD * 3).unwrap();
        arena.pop_scratch(mark);
        assert_eq!(arena.stats().used_bytes, 0);
    }

    #[test]
    fn nested_marks_pop_in_lifo_order() {
        let mut arena = Arena::new(WORD * 8).unwrap();
        let outer = arena.scratch_mark();
        arena.alloc_raw(WORD).unwrap();
        let inner = arena.scratch_mark();
        arena.alloc_raw(WORD).unwrap();
        arena.pop_scratch(inner);
        assert_eq!(arena.stats().used_bytes, WORD);
        arena.pop_scratch(outer);
        assert_eq!(arena.stats().used_bytes, 0);
        assert_eq!(arena.open_marks(), 1);
    }

    #[test]
    #[should_panic(expected = "invalidated")]
    fn popping_mark_invalidated_by_earlier_pop_panics() {
        let mut arena = Arena::new(WORD * 8).unwrap();
        let outer = arena.scratch_mark();
        arena.alloc_raw(WORD).unwrap();
        let inner = arena.scratch_mark();
        arena.pop_scratch(outer);
        arena.pop_scratch(inner);
    }

    #[test]
    #[should_panic(expected = "invalidated")]
    fn popping_mark_invalidated_by_reset_panics() {
        let mut arena = Arena::new(WORD * 8).unwrap();
        let mark = arena.scratch_mark();
        arena.reset();
        arena.pop_scratch(mark);
    }

    #[test]
    #[should_panic(expected = "belongs to arena")]
    fn popping_foreign_mark_panics() {
        let other = Arena::new(WORD * 8).unwrap();
        let mut arena = Arena::new(WORD * 8).unwrap();
        let mark = other.scratch_mark();
        arena.pop_scratch(mark);
    }

    #[test]
    fn balanced_mark_pop_cycles_keep_mark_stack_bounded() {
        let mut arena = Arena::new(WORD * 8).unwrap();
        arena.alloc_raw(WORD).unwrap();
        for _ in 0..10_000 {
            let mark = arena.scratch_mark();
            arena.alloc_raw(64).unwrap();
            arena.pop_scratch(mark);
        }
        for _ in 0..10_000 {
            arena.with_scratch(|scratch| {
                scratch.alloc_raw(64).unwrap();
            });
        }
        assert!(arena.open_marks() <= 1);
        assert_eq!(arena.stats().used_bytes, WORD);
    }

    #[test]
    fn nested_marks_at_same_position_pop_identically() {
        let mut arena = Arena::new(WORD * 8).unwrap();
        let outer = arena.scratch_mark();
        let inner = arena.scratch_mark();
        arena.alloc_raw(WORD * 3).unwrap();
        arena.pop_scratch(inner);
        assert_eq!(arena.stats().used_bytes, 0);
        arena.alloc_raw(WORD).unwrap();
        arena.pop_scratch(outer);
        assert_eq!(arena.stats().used_bytes, 0);
    }

    #[test]
    fn out_of_memory_leaves_arena_unchanged() {
        let arena = Arena::new(WORD * 8).unwrap();
        arena.alloc_raw(WORD * 3).unwrap();
        let before = (arena.region_stats(), arena.current_region());

        let result = arena.alloc_raw(usize::MAX / 2);
        assert!(matches!(result, Err(ArenaError::OutOfMemory { .. })));

        let after = (arena.region_stats(), arena.current_region());
        assert_eq!(before, after);
        assert!(arena.alloc_raw(WORD).is_ok());
    }

    #[test]
    fn with_scratch_releases_closure_allocations() {
        let mut arena = Arena::new(WORD * 8).unwrap();
        arena.alloc_raw(WORD).unwrap();
        let sum = arena.with_scratch(|scratch| {
            let buf = scratch.alloc_slice_copy(&[1u8; 200]).unwrap();
            buf.iter().map(|&b| b as u32).sum::<u32>()
        });
        assert_eq!(sum, 200);
        assert_eq!(arena.stats().used_bytes, WORD);
        assert_eq!(arena.current_region(), 0);
    }

    #[test]
    fn destroy_consumes_arena() {
        let arena = Arena::new(WORD * 8).unwrap();
        arena.alloc_raw(WORD * 20).unwrap();
        arena.destroy();
    }

    #[test]
    fn arena_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Arena>();
    }

    proptest! {
        #[test]
        fn pop_restores_used_across_chain(
            budget in 0usize..256,
            before in proptest::collection::vec(0usize..300, 0..8),
            after in proptest::collection::vec(0usize..600, 0..16),
        ) {
            let mut arena = Arena::new(budget).unwrap();
            for size in &before {
                arena.alloc_raw(*size).unwrap();
            }
            let snapshot = used_words(&arena);
            let end = arena.current_region();
            let mark = arena.scratch_mark();
            for size in &after {
                arena.alloc_raw(*size).unwrap();
            }
            arena.pop_scratch(mark);

            let restored = used_words(&arena);
            prop_assert_eq!(&restored[..snapshot.len()], &snapshot[..]);
            prop_assert!(restored[snapshot.len()..].iter().all(|&u| u == 0));
            prop_assert_eq!(arena.current_region(), end);
        }

        #[test]
        fn allocations_never_overlap(
            budget in 0usize..512,
            sizes in proptest::collection::vec(0usize..200, 1..32),
        ) {
            let arena = Arena::new(budget).unwrap();
            let mut spans = Vec::new();
            for size in &sizes {
                let ptr = arena.alloc_raw(*size).unwrap();
                let region = arena.region_containing(ptr.as_ptr());
                if *size > 0 {
                    prop_assert_eq!(region, Some(arena.current_region()));
                    let last = ptr.as_ptr() as usize + raw::words_for(*size).unwrap() * WORD - 1;
                    prop_assert_eq!(arena.region_containing(last as *const u8), region);
                }
                spans.push((ptr.as_ptr() as usize, *size));
            }
            spans.retain(|&(_, len)| len > 0);
            spans.sort_unstable();
            for pair in spans.windows(2) {
                prop_assert!(pair[0].0 + pair[0].1 <= pair[1].0);
            }
        }

        #[test]
        fn reset_is_idempotent(
            budget in 0usize..256,
            sizes in proptest::collection::vec(0usize..300, 0..16),
        ) {
            let mut arena = Arena::new(budget).unwrap();
            for size in &sizes {
                arena.alloc_raw(*size).unwrap();
            }
            arena.reset();
            let once = (arena.region_stats(), arena.current_region());
            arena.reset();
            let twice = (arena.region_stats(), arena.current_region());
            prop_assert_eq!(once, twice);
        }
    }
}
