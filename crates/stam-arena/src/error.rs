//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during arena operations.
///
/// Caller misuse (popping an invalidated mark, popping a mark taken on a
/// different arena) is not represented here: it is a programming error and
/// panics instead of returning a recoverable value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The request does not fit in the remaining space of one region.
    ///
    /// Only [`Region`](crate::Region) returns this. The arena absorbs it by
    /// moving on to the next region or growing the chain.
    OutOfCapacity {
        /// Number of bytes requested, after word rounding.
        requested: usize,
        /// Bytes still free in the region.
        remaining: usize,
    },
    /// The system allocator could not provide a new region.
    OutOfMemory {
        /// Number of bytes the new region needed.
        requested: usize,
    },
    /// An [`ArenaConfig`](crate::ArenaConfig) was rejected at construction.
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfCapacity {
                requested,
                remaining,
            } => {
                write!(
                    f,
                    "region capacity exceeded: requested {requested} bytes, {remaining} bytes remaining"
                )
            }
            Self::OutOfMemory { requested } => {
                write!(f, "system allocation of {requested} bytes failed")
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid arena config: {reason}")
            }
        }
    }
}

impl Error for ArenaError {}
