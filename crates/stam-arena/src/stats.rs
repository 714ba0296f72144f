//! Usage snapshots for diagnostics.
//!
//! Nothing here feeds back into allocation decisions.

use std::fmt;

/// Usage of a single region, in bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionStats {
    /// Bytes handed out from this region since its last reset.
    pub used_bytes: usize,
    /// Total bytes the region can hold.
    pub capacity_bytes: usize,
}

/// Usage totals across an arena's region chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Bytes currently handed out, summed over all regions.
    pub used_bytes: usize,
    /// Bytes reserved from the system, summed over all regions.
    pub reserved_bytes: usize,
    /// Number of regions in the chain.
    pub region_count: usize,
}

impl ArenaStats {
    /// Fold per-region stats into chain totals.
    pub fn from_regions(regions: &[RegionStats]) -> Self {
        regions.iter().fold(Self::default(), |acc, r| Self {
            used_bytes: acc.used_bytes + r.used_bytes,
            reserved_bytes: acc.reserved_bytes + r.capacity_bytes,
            region_count: acc.region_count + 1,
        })
    }
}

impl fmt::Display for ArenaStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "used {} bytes, reserved {} bytes, {} regions",
            self.used_bytes, self.reserved_bytes, self.region_count
        )
    }
}
