//! Contiguous memory regions with bump allocation.
//!
//! A [`Region`] is one fixed-size block of words with a cursor that advances
//! on each allocation. Regions are never resized. The [`Arena`](crate::Arena)
//! chains them to grow without relocating pointers it has already handed out.

use std::fmt;
use std::ptr::NonNull;

use crate::error::ArenaError;
use crate::raw::{self, RawBlock, WORD};

/// A single contiguous memory block with bump allocation.
///
/// Capacity and usage are counted in words ([`WORD`] bytes each). Requests
/// are rounded up to whole words, so every returned pointer is word-aligned.
/// Memory is never zeroed: `data[0..used)` is live, `data[used..capacity)`
/// is free and may hold stale bytes from before a reset.
pub struct Region {
    /// Backing storage, allocated to full capacity at creation.
    block: RawBlock,
    /// Bump pointer: number of words handed out so far.
    used: usize,
}

impl Region {
    /// Create a region holding at least `size_bytes`, rounded up to whole
    /// words.
    ///
    /// Returns `Err(ArenaError::OutOfMemory)` if the system allocator fails.
    pub fn new(size_bytes: usize) -> Result<Self, ArenaError> {
        let words = raw::words_for(size_bytes).ok_or(ArenaError::OutOfMemory {
            requested: size_bytes,
        })?;
        Self::with_words(words)
    }

    /// Create a region of exactly `words` words.
    pub(crate) fn with_words(words: usize) -> Result<Self, ArenaError> {
        Ok(Self {
            block: RawBlock::allocate(words)?,
            used: 0,
        })
    }

    /// Bump-allocate `size_bytes`, rounded up to whole words.
    ///
    /// Returns a pointer to uninitialised memory, or
    /// `Err(ArenaError::OutOfCapacity)` if the rounded request does not fit
    /// in the remaining space. A failed call leaves the region unchanged.
    pub fn allocate(&mut self, size_bytes: usize) -> Result<NonNull<u8>, ArenaError> {
        match raw::words_for(size_bytes) {
            Some(words) => self.allocate_words(words),
            None => Err(ArenaError::OutOfCapacity {
                requested: size_bytes,
                remaining: self.remaining_bytes(),
            }),
        }
    }

    /// Bump-allocate `words` words.
    pub(crate) fn allocate_words(&mut self, words: usize) -> Result<NonNull<u8>, ArenaError> {
        if !self.fits(words) {
            return Err(ArenaError::OutOfCapacity {
                requested: words.saturating_mul(WORD),
                remaining: self.remaining_bytes(),
            });
        }
        let ptr = self.block.word_ptr(self.used);
        self.used += words;
        Ok(ptr)
    }

    /// Whether `words` more words fit in this region.
    pub fn fits(&self, words: usize) -> bool {
        words <= self.remaining()
    }

    /// Reset the bump pointer to zero without deallocating.
    ///
    /// All previous allocations become invalid. The backing memory is NOT
    /// zeroed.
    pub fn reset(&mut self) {
        self.used = 0;
    }

    /// Move the bump pointer back to `used` words.
    ///
    /// # Panics
    ///
    /// Panics if `used` is beyond the current cursor: a rewind can only
    /// release memory, never claim it.
    pub(crate) fn rewind(&mut self, used: usize) {
        assert!(
            used <= self.used,
            "cannot rewind region forward (cursor {}, target {used})",
            self.used,
        );
        self.used = used;
    }

    /// Whether `ptr` points into this region's buffer.
    pub fn contains(&self, ptr: *const u8) -> bool {
        let base = self.block.base() as usize;
        let addr = ptr as usize;
        addr >= base && addr < base + self.capacity_bytes()
    }

    /// Number of words currently allocated.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Total capacity in words.
    pub fn capacity(&self) -> usize {
        self.block.words()
    }

    /// Remaining free capacity in words.
    pub fn remaining(&self) -> usize {
        self.capacity() - self.used
    }

    /// Bytes currently allocated.
    pub fn used_bytes(&self) -> usize {
        self.used * WORD
    }

    /// Total capacity in bytes.
    pub fn capacity_bytes(&self) -> usize {
        self.capacity() * WORD
    }

    /// Remaining free capacity in bytes.
    pub fn remaining_bytes(&self) -> usize {
        self.remaining() * WORD
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("used", &self.used)
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "used {} bytes, capacity {} bytes",
            self.used_bytes(),
            self.capacity_bytes()
        )
    }
}
