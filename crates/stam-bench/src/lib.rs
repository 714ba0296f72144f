//! Workload profiles and utilities for benchmarking the stam arena.
//!
//! - [`frame_profile`]: small first region, multiplicative growth, reset per frame
//! - [`long_lived_profile`]: large first region, fixed-increment growth
//! - [`request_sizes`]: deterministic mixed request sizes via seed
//! - [`load_blob`]: read a transient binary (e.g. a shader module) into arena memory

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::error::Error;
use std::fmt;
use std::io::{self, Read};

use stam_arena::{Arena, ArenaConfig, ArenaError, GrowthPolicy, KB, MB};

/// Config for a per-frame scratch arena: 64 KiB first region, doubling growth.
pub fn frame_profile() -> ArenaConfig {
    ArenaConfig::new(64 * KB).with_growth(GrowthPolicy::Multiply { factor: 2 })
}

/// Config for a long-lived arena: 1 MiB first region, 1 MiB increments.
pub fn long_lived_profile() -> ArenaConfig {
    ArenaConfig::new(MB).with_growth(GrowthPolicy::Fixed { bytes: MB })
}

/// Generate `n` deterministic request sizes in `1..=max`.
///
/// Uses the same LCG constants as the PCG family so runs are reproducible
/// across platforms.
pub fn request_sizes(n: usize, max: usize, seed: u64) -> Vec<usize> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 33) as usize % max.max(1)) + 1
        })
        .collect()
}

/// Errors from [`load_blob`].
#[derive(Debug)]
pub enum LoadError {
    /// The arena could not reserve the buffer.
    Arena(ArenaError),
    /// The reader failed or ended early.
    Io(io::Error),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arena(e) => write!(f, "blob buffer allocation failed: {e}"),
            Self::Io(e) => write!(f, "blob read failed: {e}"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arena(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<ArenaError> for LoadError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}

impl From<io::Error> for LoadError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Read exactly `len` bytes from `reader` into a fresh arena buffer.
///
/// Intended to be bracketed by a scratch mark: the buffer lives only as long
/// as the caller needs it to build a longer-lived object.
pub fn load_blob<'a, R: Read>(
    arena: &'a Arena,
    reader: &mut R,
    len: usize,
) -> Result<&'a [u8], LoadError> {
    let buf = arena.alloc_slice_fill(len, 0u8)?;
    reader.read_exact(buf)?;
    Ok(buf)
}
