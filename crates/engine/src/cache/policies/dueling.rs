//! Set-Dueling Insertion Policy.
//!
//! Chooses at runtime between two insertion disciplines for the whole cache:
//!
//! - **LRU insertion:** a filled line goes to the top of the stack.
//! - **MRU insertion:** a filled line goes to the bottom of the stack, so it is
//!   the next victim unless it is hit first. This protects the working set
//!   from streams that would never be reused.
//!
//! A few *leader* sets always use one discipline: sets whose low
//! `leader_bits` index bits are all ones lead for MRU, all zeros lead for LRU.
//! Misses in the leaders move a saturating policy counter (LRU-leader misses
//! count up, MRU-leader misses count down); once it exceeds the threshold the
//! remaining *follower* sets adopt MRU insertion.
//!
//! MRU insertion is throttled per set: every MRU-resolved miss decrements the
//! set's local counter, and a miss that finds it at zero inserts with LRU
//! instead and reloads the counter.

use tracing::trace;

use super::ReplacementPolicy;
use crate::cache::meta::LineStore;
use crate::common::{Access, ReplError};
use crate::config::DuelingConfig;
use crate::stats::ReplacementStats;

/// Insertion discipline a set follows for one access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discipline {
    /// Insert filled lines at the MRU position.
    Lru,
    /// Insert filled lines at the LRU position.
    Mru,
}

/// Part a set plays in the duel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetRole {
    /// Always uses LRU insertion; its misses favour MRU.
    LruLeader,
    /// Always uses MRU insertion; its misses favour LRU.
    MruLeader,
    /// Uses whichever discipline is currently winning.
    Follower,
}

/// Set-dueling policy state.
#[derive(Debug, Clone)]
pub struct SetDuelingPolicy {
    policy_counter: u32,
    selector: Discipline,
    /// Per-set MRU insertion throttle.
    local: Vec<u32>,
    leader_mask: usize,
    counter_max: u32,
    threshold: u32,
    local_reset: u32,
    mru_insertions: u64,
    promoted_insertions: u64,
}

impl SetDuelingPolicy {
    /// Creates a new set-dueling policy for a cache with `sets` sets.
    ///
    /// # Errors
    ///
    /// Returns [`ReplError::Allocation`] if the per-set counters cannot be
    /// allocated.
    pub fn new(config: &DuelingConfig, sets: usize) -> Result<Self, ReplError> {
        let mut local = Vec::new();
        local
            .try_reserve_exact(sets)
            .map_err(|e| ReplError::allocation("dueling counters", e))?;
        local.resize(sets, config.local_counter_init);

        Ok(Self {
            policy_counter: 0,
            selector: Discipline::Lru,
            local,
            leader_mask: config.leader_mask(),
            counter_max: config.counter_max,
            threshold: config.threshold,
            local_reset: config.local_counter_reset,
            mru_insertions: 0,
            promoted_insertions: 0,
        })
    }

    /// Global tally of leader misses, in `[0, counter_max]`.
    pub const fn policy_counter(&self) -> u32 {
        self.policy_counter
    }

    /// Discipline followers currently adopt.
    pub const fn selector(&self) -> Discipline {
        self.selector
    }

    /// MRU insertion throttle of `set`, or `None` if `set` is out of range.
    pub fn local_counter(&self, set: usize) -> Option<u32> {
        self.local.get(set).copied()
    }

    /// Role of `set` in the duel.
    pub const fn role(&self, set: usize) -> SetRole {
        let bits = set & self.leader_mask;
        if bits == self.leader_mask {
            SetRole::MruLeader
        } else if bits == 0 {
            SetRole::LruLeader
        } else {
            SetRole::Follower
        }
    }

    /// Discipline `set` follows for the next access.
    pub const fn discipline(&self, set: usize) -> Discipline {
        match self.role(set) {
            SetRole::LruLeader => Discipline::Lru,
            SetRole::MruLeader => Discipline::Mru,
            SetRole::Follower => self.selector,
        }
    }

    fn record_leader_miss(&mut self, role: SetRole) {
        match role {
            SetRole::MruLeader => self.policy_counter = self.policy_counter.saturating_sub(1),
            SetRole::LruLeader => {
                self.policy_counter = (self.policy_counter + 1).min(self.counter_max);
            }
            SetRole::Follower => {}
        }
    }
}

impl ReplacementPolicy for SetDuelingPolicy {
    fn update(&mut self, lines: &mut LineStore, access: &Access) {
        let (set, way) = (access.set, access.way);
        let role = self.role(set);
        let discipline = self.discipline(set);

        if !access.hit {
            self.record_leader_miss(role);
            if discipline == Discipline::Mru {
                self.local[set] = self.local[set].saturating_sub(1);
            }
        }

        self.selector = if self.policy_counter > self.threshold {
            Discipline::Mru
        } else {
            Discipline::Lru
        };

        let throttled = self.local[set] == 0;
        if access.hit || discipline == Discipline::Lru || throttled {
            if !access.hit {
                self.promoted_insertions += 1;
            }
            lines.promote(set, way);
        } else {
            self.mru_insertions += 1;
            lines.demote(set, way);
        }
        if throttled {
            self.local[set] = self.local_reset;
        }

        trace!(
            set,
            way,
            ?role,
            ?discipline,
            policy_counter = self.policy_counter,
            "dueling update"
        );
    }

    /// Eviction order is the LRU stack.
    fn get_victim(&mut self, lines: &mut LineStore, set: usize) -> usize {
        lines.lru_way(set)
    }

    fn export_stats(&self, stats: &mut ReplacementStats) {
        stats.mru_insertions = self.mru_insertions;
        stats.promoted_insertions = self.promoted_insertions;
    }
}
