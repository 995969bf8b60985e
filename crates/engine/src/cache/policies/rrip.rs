//! Static Re-Reference Interval Prediction (SRRIP).
//!
//! Every line carries a 2-bit re-reference prediction value (RRPV): 0 predicts
//! near-immediate reuse, 3 predicts reuse in the distant future.
//!
//! - A hit resets the line to 0.
//! - The victim is the first way predicted distant (RRPV 3). If no way is
//!   distant, the whole set ages until one is. The chosen way drops to RRPV 2,
//!   so the line filled into it starts with a long predicted interval and has
//!   to earn a hit before it outlives older lines.
//!
//! Scans therefore pass through the cache without flushing lines that have
//! already shown reuse, which pure recency cannot do.
//!
//! # Victim timing
//!
//! With [`VictimTiming::Immediate`] the search runs inside `get_victim`. With
//! [`VictimTiming::Deferred`] it runs during the update for each miss and the
//! result is parked per set until the next `get_victim` on that set.

use tracing::trace;

use super::ReplacementPolicy;
use crate::cache::meta::{LineStore, RRPV_DISTANT, RRPV_LONG};
use crate::common::{Access, ReplError};
use crate::config::{RripConfig, VictimTiming};
use crate::stats::ReplacementStats;

/// Outcome of one victim search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VictimSearch {
    /// The chosen way. Its RRPV has already been lowered to 2.
    pub way: usize,
    /// Number of times the set was aged before a distant way appeared.
    pub aging_passes: u8,
}

impl VictimSearch {
    /// Number of scans over the set the search is equivalent to.
    ///
    /// Never more than `RRPV_DISTANT + 1`.
    pub const fn scans(&self) -> u8 {
        self.aging_passes + 1
    }
}

/// Finds the victim in `set`, ageing the set as needed, and demotes it.
///
/// Ageing every way by one until some way reaches the distant value is the
/// same as ageing every way by `RRPV_DISTANT - max` at once, so the search is
/// a bounded number of passes over the set regardless of its contents.
pub fn search_victim(lines: &mut LineStore, set: usize) -> VictimSearch {
    let ways = lines.set_mut(set);

    let oldest = ways.iter().map(|l| l.rrpv).max().unwrap_or(RRPV_DISTANT);
    let aging_passes = RRPV_DISTANT.saturating_sub(oldest);
    if aging_passes > 0 {
        for line in ways.iter_mut() {
            line.rrpv = (line.rrpv + aging_passes).min(RRPV_DISTANT);
        }
    }

    let way = ways
        .iter()
        .position(|l| l.rrpv == RRPV_DISTANT)
        .unwrap_or(0);
    ways[way].rrpv = RRPV_LONG;

    VictimSearch { way, aging_passes }
}

/// SRRIP Policy state.
#[derive(Debug, Clone)]
pub struct RripPolicy {
    timing: VictimTiming,
    /// Victim computed during the last miss update of each set (deferred timing only).
    parked: Vec<Option<usize>>,
    aging_passes: u64,
}

impl RripPolicy {
    /// Creates a new SRRIP policy instance for a cache with `sets` sets.
    ///
    /// # Errors
    ///
    /// Returns [`ReplError::Allocation`] if the per-set victim slots cannot be
    /// allocated.
    pub fn new(config: &RripConfig, sets: usize) -> Result<Self, ReplError> {
        let mut parked = Vec::new();
        if config.victim_timing == VictimTiming::Deferred {
            parked
                .try_reserve_exact(sets)
                .map_err(|e| ReplError::allocation("rrip victim slots", e))?;
            parked.resize(sets, None);
        }
        Ok(Self {
            timing: config.victim_timing,
            parked,
            aging_passes: 0,
        })
    }

    /// When this engine computes its victims.
    pub const fn timing(&self) -> VictimTiming {
        self.timing
    }

    /// Victim parked for `set` by the last miss update, if any.
    pub fn parked_victim(&self, set: usize) -> Option<usize> {
        self.parked.get(set).copied().flatten()
    }

    fn search(&mut self, lines: &mut LineStore, set: usize) -> usize {
        let found = search_victim(lines, set);
        self.aging_passes += u64::from(found.aging_passes);
        trace!(set, way = found.way, aging = found.aging_passes, "rrip victim");
        found.way
    }
}

impl ReplacementPolicy for RripPolicy {
    fn update(&mut self, lines: &mut LineStore, access: &Access) {
        let (set, way) = (access.set, access.way);

        if access.hit {
            lines.line_mut(set, way).rrpv = 0;
            // A parked victim that just hit is no longer a good choice.
            if self.parked_victim(set) == Some(way) {
                self.parked[set] = None;
            }
            return;
        }

        lines.line_mut(set, way).rrpv = RRPV_LONG;
        if self.timing == VictimTiming::Deferred {
            let next = self.search(lines, set);
            self.parked[set] = Some(next);
        }
    }

    fn get_victim(&mut self, lines: &mut LineStore, set: usize) -> usize {
        if let Some(way) = self.parked.get_mut(set).and_then(Option::take) {
            return way;
        }
        self.search(lines, set)
    }

    fn export_stats(&self, stats: &mut ReplacementStats) {
        stats.aging_passes = self.aging_passes;
    }
}
