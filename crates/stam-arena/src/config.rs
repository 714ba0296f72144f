//! Arena configuration parameters.

use crate::error::ArenaError;
use crate::raw::{self, WORD};

/// One kibibyte, for sizing budgets (`16 * KB`).
pub const KB: usize = 1024;
/// One mebibyte.
pub const MB: usize = 1024 * KB;
/// One gibibyte.
pub const GB: usize = 1024 * MB;

/// How the arena sizes a region appended when the chain is exhausted.
///
/// Whatever the policy, a new region is always large enough for the request
/// that triggered it, so growth never fails because of size alone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GrowthPolicy {
    /// Match the capacity of the region being extended, or the request if it
    /// is larger. Successive growths keep the chain's per-region locality.
    #[default]
    MatchPrevious,
    /// Every new region holds `bytes` (rounded up to whole words), or the
    /// request if it is larger. Suited to long-lived arenas with a steady
    /// allocation rate.
    Fixed {
        /// Capacity of each appended region in bytes. Must be non-zero.
        bytes: usize,
    },
    /// Each new region is `factor` times the region being extended.
    /// Suited to per-frame scratch arenas that should settle quickly.
    Multiply {
        /// Growth multiplier. Must be at least 1.
        factor: usize,
    },
}

impl GrowthPolicy {
    /// Capacity in words of the region appended after one of `prev_words`,
    /// to serve a request of `request_words`.
    pub fn next_capacity(&self, prev_words: usize, request_words: usize) -> usize {
        let proposed = match *self {
            Self::MatchPrevious => prev_words,
            Self::Fixed { bytes } => raw::words_for(bytes).unwrap_or(usize::MAX / WORD),
            Self::Multiply { factor } => prev_words.saturating_mul(factor),
        };
        proposed.max(request_words)
    }
}

/// Configuration for an [`Arena`](crate::Arena).
///
/// Validated at construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Byte budget of the first region, rounded up to whole words.
    ///
    /// Default: 64 KiB. Zero is accepted: the first allocation then grows
    /// the chain with a region sized to that request.
    pub initial_bytes: usize,

    /// Sizing rule for regions appended on growth.
    pub growth: GrowthPolicy,
}

impl ArenaConfig {
    /// Default first-region budget.
    pub const DEFAULT_INITIAL_BYTES: usize = 64 * KB;

    /// Create a config with the given first-region budget and the default
    /// growth policy.
    pub fn new(initial_bytes: usize) -> Self {
        Self {
            initial_bytes,
            growth: GrowthPolicy::default(),
        }
    }

    /// Replace the growth policy.
    pub fn with_growth(mut self, growth: GrowthPolicy) -> Self {
        self.growth = growth;
        self
    }

    /// Check the config for values the arena cannot honour.
    pub fn validate(&self) -> Result<(), ArenaError> {
        match self.growth {
            GrowthPolicy::Fixed { bytes: 0 } => Err(ArenaError::InvalidConfig {
                reason: "fixed growth increment must be non-zero".into(),
            }),
            GrowthPolicy::Multiply { factor: 0 } => Err(ArenaError::InvalidConfig {
                reason: "growth factor must be >= 1 (got 0)".into(),
            }),
            _ => Ok(()),
        }
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INITIAL_BYTES)
    }
}
