//! Low-level primitives for region memory.
//!
//! This is the only module allowed to hold `unsafe` blocks besides the
//! typed views in [`crate::arena`]. Every `unsafe` block carries a
//! mandatory `// SAFETY:` comment.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use crate::error::ArenaError;

/// Size of one allocation unit in bytes: the platform's native word.
///
/// Every request is rounded up to a whole number of words, so every pointer
/// handed out by a region is aligned to at least `WORD`.
pub const WORD: usize = std::mem::size_of::<usize>();

/// Number of words needed to hold `size_bytes`, rounding up.
///
/// Returns `None` if the rounding overflows `usize`.
pub fn words_for(size_bytes: usize) -> Option<usize> {
    Some(size_bytes.checked_add(WORD - 1)? / WORD)
}

/// An owned, word-aligned block of uninitialised memory.
///
/// Zero-length blocks never touch the system allocator and use a dangling,
/// word-aligned pointer.
pub(crate) struct RawBlock {
    ptr: NonNull<usize>,
    layout: Layout,
}

// SAFETY: a RawBlock exclusively owns its allocation; nothing else holds the
// pointer, so moving the owner to another thread is sound.
unsafe impl Send for RawBlock {}

impl RawBlock {
    /// Allocate a block of `words` words from the system allocator.
    ///
    /// Returns `ArenaError::OutOfMemory` if the layout overflows or the
    /// allocator returns null. The allocator is not allowed to abort here:
    /// failure is reported to the caller.
    pub(crate) fn allocate(words: usize) -> Result<Self, ArenaError> {
        let requested = words.saturating_mul(WORD);
        let layout = Layout::array::<usize>(words)
            .map_err(|_| ArenaError::OutOfMemory { requested })?;

        if layout.size() == 0 {
            return Ok(Self {
                ptr: NonNull::dangling(),
                layout,
            });
        }

        // SAFETY: `layout` has a non-zero size (checked above).
        let ptr = unsafe { alloc::alloc(layout) }.cast::<usize>();
        let ptr = NonNull::new(ptr).ok_or(ArenaError::OutOfMemory { requested })?;
        Ok(Self { ptr, layout })
    }

    /// Capacity of the block in words.
    pub(crate) fn words(&self) -> usize {
        self.layout.size() / WORD
    }

    /// Address of the first word, for containment checks.
    pub(crate) fn base(&self) -> *const u8 {
        self.ptr.as_ptr().cast_const().cast()
    }

    /// Pointer to the word at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is past the end of the block.
    pub(crate) fn word_ptr(&self, offset: usize) -> NonNull<u8> {
        assert!(
            offset <= self.words(),
            "word offset {offset} out of bounds for block of {} words",
            self.words(),
        );
        // SAFETY: `offset <= words`, so the result is inside the allocation or
        // one past its end, which `add` permits. For zero-length blocks the
        // only accepted offset is 0.
        unsafe { self.ptr.add(offset) }.cast()
    }
}

impl Drop for RawBlock {
    fn drop(&mut self) {
        if self.layout.size() == 0 {
            return;
        }
        // SAFETY: `ptr` was returned by `alloc::alloc` with exactly `layout`
        // and has not been freed (RawBlock is not Clone).
        unsafe { alloc::dealloc(self.ptr.as_ptr().cast(), self.layout) }
    }
}

/// Advance a word-aligned pointer to the next multiple of `align`.
///
/// The caller must have reserved at least `align - WORD` bytes of padding
/// after `ptr`, so the adjusted pointer stays inside the same allocation.
///
/// # Panics
///
/// Panics if `align` is not a power of two.
pub(crate) fn align_up(ptr: NonNull<u8>, align: usize) -> NonNull<u8> {
    assert!(align.is_power_of_two(), "alignment {align} is not a power of two");
    let offset = ptr.as_ptr().align_offset(align);
    debug_assert!(offset < align);
    // SAFETY: `offset < align` and the caller reserved `align - WORD` bytes of
    // padding; since `ptr` is already word-aligned, `offset <= align - WORD`
    // and the result stays within the reservation.
    unsafe { ptr.add(offset) }
}
