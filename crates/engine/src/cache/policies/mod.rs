//! Cache Replacement Policies.
//!
//! Implements the algorithms that select victim lines and maintain prediction
//! state for one cache level.
//!
//! # Policies
//!
//! - `Lru`: Least Recently Used (also the fallback at unmanaged levels).
//! - `Random`: Random selection.
//! - `Ship`: Signature-based hit predictor on top of the LRU stack.
//! - `Rrip`: Static re-reference interval prediction.
//! - `SetDueling`: LRU vs MRU insertion chosen by leader sets.

/// Set-dueling insertion policy.
pub mod dueling;

/// Least Recently Used replacement policy.
pub mod lru;

/// Random replacement policy.
pub mod random;

/// Static re-reference interval prediction.
pub mod rrip;

/// Signature-based hit predictor.
pub mod ship;

pub use dueling::{Discipline, SetDuelingPolicy, SetRole};
pub use lru::LruPolicy;
pub use random::RandomPolicy;
pub use rrip::{RripPolicy, VictimSearch};
pub use ship::{ShipFeeder, ShipPolicy, SignatureMap, SignatureTable};

use tracing::debug;

use super::meta::LineStore;
use crate::common::{Access, ReplError};
use crate::config::{ContestantEngine, PolicyKind, ReplacementConfig};
use crate::stats::ReplacementStats;

/// Trait for cache replacement policies.
///
/// Per-line state lives in the [`LineStore`] owned by the replacement state;
/// implementations own only their global structures.
pub trait ReplacementPolicy: Send + Sync {
    /// Updates the policy state after a hit on, or a fill of, `access.way`.
    ///
    /// # Arguments
    ///
    /// * `lines` - Per-line metadata of the cache level.
    /// * `access` - The completed access. Set and way are already validated.
    fn update(&mut self, lines: &mut LineStore, access: &Access);

    /// Selects a victim line to evict from a specific set.
    ///
    /// # Arguments
    ///
    /// * `lines` - Per-line metadata of the cache level.
    /// * `set` - The cache set index (already validated).
    ///
    /// # Returns
    ///
    /// The index of the way to evict.
    fn get_victim(&mut self, lines: &mut LineStore, set: usize) -> usize;

    /// Copies engine-specific counters into `stats`.
    fn export_stats(&self, _stats: &mut ReplacementStats) {}
}

/// Enum wrapper for static dispatch of replacement policies.
/// This avoids vtable lookups on the host's per-access path.
#[derive(Debug, Clone)]
pub enum PolicyWrapper {
    /// Least Recently Used.
    Lru(LruPolicy),
    /// Random selection.
    Random(RandomPolicy),
    /// SHiP signature recording at the feeder level.
    ShipFeeder(ShipFeeder),
    /// SHiP at the managed level.
    Ship(ShipPolicy),
    /// SRRIP at the managed level.
    Rrip(RripPolicy),
    /// Set dueling at the managed level.
    SetDueling(SetDuelingPolicy),
}

impl PolicyWrapper {
    /// Builds the policy `kind` for the cache level described by `config`.
    ///
    /// For [`PolicyKind::Contestant`] the configured engine runs only at its
    /// managed level; SHiP additionally records signatures at its feeder level
    /// into `map`. Every other level gets LRU.
    ///
    /// # Errors
    ///
    /// Returns [`ReplError::Allocation`] if engine storage cannot be allocated.
    pub fn build(
        config: &ReplacementConfig,
        kind: PolicyKind,
        map: &SignatureMap,
    ) -> Result<Self, ReplError> {
        let contestant = &config.contestant;
        let managed = config.level == contestant.managed_level;

        let policy = match kind {
            PolicyKind::Lru => Self::Lru(LruPolicy::new()),
            PolicyKind::Random => Self::Random(RandomPolicy::new(config.random_seed)),
            PolicyKind::Contestant => match contestant.engine {
                ContestantEngine::Ship if managed => {
                    Self::Ship(ShipPolicy::new(&contestant.ship, map.clone())?)
                }
                ContestantEngine::Ship if config.level == contestant.feeder_level => {
                    Self::ShipFeeder(ShipFeeder::new(map.clone(), contestant.ship.table_size))
                }
                ContestantEngine::Rrip if managed => {
                    Self::Rrip(RripPolicy::new(&contestant.rrip, config.sets)?)
                }
                ContestantEngine::SetDueling if managed => {
                    Self::SetDueling(SetDuelingPolicy::new(&contestant.dueling, config.sets)?)
                }
                _ => Self::Lru(LruPolicy::new()),
            },
        };

        debug!(
            level = ?config.level,
            ?kind,
            policy = policy.name(),
            "built replacement policy"
        );
        Ok(policy)
    }

    /// Short name of the active algorithm.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Lru(_) => "lru",
            Self::Random(_) => "random",
            Self::ShipFeeder(_) => "ship-feeder",
            Self::Ship(_) => "ship",
            Self::Rrip(_) => "rrip",
            Self::SetDueling(_) => "set-dueling",
        }
    }
}

impl ReplacementPolicy for PolicyWrapper {
    #[inline(always)]
    fn update(&mut self, lines: &mut LineStore, access: &Access) {
        match self {
            Self::Lru(p) => p.update(lines, access),
            Self::Random(p) => p.update(lines, access),
            Self::ShipFeeder(p) => p.update(lines, access),
            Self::Ship(p) => p.update(lines, access),
            Self::Rrip(p) => p.update(lines, access),
            Self::SetDueling(p) => p.update(lines, access),
        }
    }

    #[inline(always)]
    fn get_victim(&mut self, lines: &mut LineStore, set: usize) -> usize {
        match self {
            Self::Lru(p) => p.get_victim(lines, set),
            Self::Random(p) => p.get_victim(lines, set),
            Self::ShipFeeder(p) => p.get_victim(lines, set),
            Self::Ship(p) => p.get_victim(lines, set),
            Self::Rrip(p) => p.get_victim(lines, set),
            Self::SetDueling(p) => p.get_victim(lines, set),
        }
    }

    fn export_stats(&self, stats: &mut ReplacementStats) {
        match self {
            Self::Lru(p) => p.export_stats(stats),
            Self::Random(p) => p.export_stats(stats),
            Self::ShipFeeder(p) => p.export_stats(stats),
            Self::Ship(p) => p.export_stats(stats),
            Self::Rrip(p) => p.export_stats(stats),
            Self::SetDueling(p) => p.export_stats(stats),
        }
    }
}
