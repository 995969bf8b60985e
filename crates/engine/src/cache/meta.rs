//! Per-line replacement metadata.
//!
//! Every (set, way) carries the fields consulted by all policies: the LRU stack
//! position, the SHiP signature and reuse bit, and the RRIP re-reference
//! prediction value. Storage is one flat vector indexed by `set * ways + way`.
//!
//! The LRU stack primitives live here because three of the five policies
//! share them and each must keep the per-set permutation intact.

use crate::common::ReplError;

/// Largest re-reference prediction value ("distant").
pub const RRPV_DISTANT: u8 = 3;

/// Re-reference prediction value given to a line chosen for replacement.
pub const RRPV_LONG: u8 = 2;

/// Replacement state of a single cache line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineMeta {
    /// LRU recency rank. 0 is MRU, `ways - 1` is LRU.
    pub stack_position: usize,
    /// Hashed PC that inserted the line.
    pub signature: u64,
    /// Whether the line has been hit since its last insertion.
    pub reused: bool,
    /// Re-reference prediction value in `[0, RRPV_DISTANT]`.
    pub rrpv: u8,
}

impl LineMeta {
    const fn initial(way: usize) -> Self {
        Self {
            stack_position: way,
            signature: 0,
            reused: false,
            rrpv: RRPV_DISTANT,
        }
    }
}

/// Replacement metadata for every line of one cache level.
#[derive(Clone, Debug)]
pub struct LineStore {
    lines: Vec<LineMeta>,
    sets: usize,
    ways: usize,
}

impl LineStore {
    /// Allocates metadata for `sets * ways` lines.
    ///
    /// Stack positions start as the identity permutation, RRPVs as distant,
    /// signatures as zero and reuse bits clear.
    ///
    /// # Errors
    ///
    /// Returns [`ReplError::InvalidConfig`] if the line count overflows and
    /// [`ReplError::Allocation`] if the storage cannot be reserved.
    pub fn new(sets: usize, ways: usize) -> Result<Self, ReplError> {
        let total = sets.checked_mul(ways).ok_or_else(|| {
            ReplError::InvalidConfig(format!("{sets} sets x {ways} ways overflows"))
        })?;

        let mut lines = Vec::new();
        lines
            .try_reserve_exact(total)
            .map_err(|e| ReplError::allocation("line metadata", e))?;
        for _ in 0..sets {
            lines.extend((0..ways).map(LineMeta::initial));
        }

        Ok(Self { lines, sets, ways })
    }

    /// Number of sets.
    #[inline(always)]
    pub const fn sets(&self) -> usize {
        self.sets
    }

    /// Associativity.
    #[inline(always)]
    pub const fn ways(&self) -> usize {
        self.ways
    }

    /// Metadata of every way in `set`.
    #[inline(always)]
    pub fn set(&self, set: usize) -> &[LineMeta] {
        let base = set * self.ways;
        &self.lines[base..base + self.ways]
    }

    /// Mutable metadata of every way in `set`.
    #[inline(always)]
    pub fn set_mut(&mut self, set: usize) -> &mut [LineMeta] {
        let base = set * self.ways;
        &mut self.lines[base..base + self.ways]
    }

    /// Metadata of one line.
    #[inline(always)]
    pub fn line(&self, set: usize, way: usize) -> &LineMeta {
        &self.lines[set * self.ways + way]
    }

    /// Mutable metadata of one line.
    #[inline(always)]
    pub fn line_mut(&mut self, set: usize, way: usize) -> &mut LineMeta {
        &mut self.lines[set * self.ways + way]
    }

    /// Way at the bottom of the LRU stack of `set`.
    ///
    /// Falls back to way 0 if the stack is not a permutation, which cannot
    /// happen through the public update paths.
    pub fn lru_way(&self, set: usize) -> usize {
        let bottom = self.ways - 1;
        self.set(set)
            .iter()
            .position(|line| line.stack_position == bottom)
            .unwrap_or(0)
    }

    /// Moves `way` to the top of the LRU stack of `set`.
    ///
    /// Every line above its old position moves down one step.
    pub fn promote(&mut self, set: usize, way: usize) {
        let lines = self.set_mut(set);
        let current = lines[way].stack_position;
        for line in lines.iter_mut() {
            if line.stack_position < current {
                line.stack_position += 1;
            }
        }
        lines[way].stack_position = 0;
    }

    /// Moves `way` to the bottom of the LRU stack of `set`.
    ///
    /// Every line below its old position moves up one step, so the next
    /// LRU victim in this set is `way`.
    pub fn demote(&mut self, set: usize, way: usize) {
        let bottom = self.ways - 1;
        let lines = self.set_mut(set);
        let current = lines[way].stack_position;
        for line in lines.iter_mut() {
            if line.stack_position > current {
                line.stack_position -= 1;
            }
        }
        lines[way].stack_position = bottom;
    }
}
