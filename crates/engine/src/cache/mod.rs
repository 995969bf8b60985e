//! Per-Level Replacement State.
//!
//! This module implements the object a host cache simulator holds for each
//! cache level. It owns the per-line metadata and the active replacement
//! policy, validates every call against the level's geometry, and counts
//! statistics. The host drives it with two calls:
//!
//! - `select_victim` on a miss to a full set, returning the way to evict;
//! - `update` after every hit or fill.
//!
//! Calls must arrive in trace order; every engine relies on it.

/// Per-line metadata store and LRU stack primitives.
pub mod meta;

/// Cache replacement policy implementations (LRU, Random, SHiP, RRIP, set dueling).
pub mod policies;

use tracing::{debug, trace};

use self::meta::{LineMeta, LineStore};
use self::policies::{
    PolicyWrapper, ReplacementPolicy, RripPolicy, SetDuelingPolicy, ShipPolicy, SignatureMap,
};
use crate::common::{Access, ReplError, VictimQuery};
use crate::config::{CacheLevel, PolicyKind, ReplacementConfig};
use crate::stats::ReplacementStats;

/// Replacement state of one cache level.
///
/// # Examples
///
/// ```
/// use replsim_core::cache::ReplacementState;
/// use replsim_core::common::{Access, VictimQuery};
/// use replsim_core::config::{CacheLevel, PolicyKind, ReplacementConfig};
///
/// let config = ReplacementConfig::new(1, 4, CacheLevel::L1, PolicyKind::Lru);
/// let mut state = ReplacementState::new(&config).unwrap();
///
/// for way in 0..4 {
///     state.update(&Access::miss(0, way, 0x10 + way as u64, 0x400)).unwrap();
/// }
/// state.update(&Access::hit(0, 0, 0x10, 0x400)).unwrap();
///
/// assert_eq!(state.select_victim(&VictimQuery::for_set(0)).unwrap(), 1);
/// ```
#[derive(Debug)]
pub struct ReplacementState {
    config: ReplacementConfig,
    lines: LineStore,
    kind: PolicyKind,
    policy: PolicyWrapper,
    map: SignatureMap,
    stats: ReplacementStats,
}

impl ReplacementState {
    /// Creates a fully initialized replacement state with a private
    /// insertion-signature map.
    ///
    /// # Errors
    ///
    /// Returns [`ReplError::InvalidConfig`] if the configuration is rejected
    /// and [`ReplError::Allocation`] if storage cannot be allocated.
    pub fn new(config: &ReplacementConfig) -> Result<Self, ReplError> {
        Self::with_signature_map(config, SignatureMap::new())
    }

    /// Creates a replacement state sharing `map` with other levels.
    ///
    /// Pass clones of one map to the SHiP feeder level and the SHiP managed
    /// level so the managed level sees the signatures the feeder recorded.
    ///
    /// # Errors
    ///
    /// Same as [`ReplacementState::new`].
    pub fn with_signature_map(
        config: &ReplacementConfig,
        map: SignatureMap,
    ) -> Result<Self, ReplError> {
        config.validate()?;
        let lines = LineStore::new(config.sets, config.ways)?;
        let policy = PolicyWrapper::build(config, config.policy, &map)?;

        debug!(
            level = ?config.level,
            sets = config.sets,
            ways = config.ways,
            policy = policy.name(),
            "replacement state ready"
        );

        Ok(Self {
            config: config.clone(),
            lines,
            kind: config.policy,
            policy,
            map,
            stats: ReplacementStats::default(),
        })
    }

    /// Chooses the way to evict from a full set.
    ///
    /// # Errors
    ///
    /// Returns [`ReplError::SetOutOfRange`] for a bad set index and
    /// [`ReplError::CandidateMismatch`] if a non-empty candidate slice does not
    /// cover the set.
    pub fn select_victim(&mut self, query: &VictimQuery<'_>) -> Result<usize, ReplError> {
        self.check_set(query.set)?;
        if !query.candidates.is_empty() && query.candidates.len() != self.config.ways {
            return Err(ReplError::CandidateMismatch {
                expected: self.config.ways,
                found: query.candidates.len(),
            });
        }

        let way = self.policy.get_victim(&mut self.lines, query.set);
        self.stats.victims += 1;
        trace!(
            set = query.set,
            way,
            pc = query.pc.val(),
            paddr = query.paddr.val(),
            "victim selected"
        );
        Ok(way)
    }

    /// Updates replacement state after a hit on, or a fill of, `access.way`.
    ///
    /// # Errors
    ///
    /// Returns [`ReplError::SetOutOfRange`] or [`ReplError::WayOutOfRange`] for
    /// bad indices; state is left untouched in that case.
    pub fn update(&mut self, access: &Access) -> Result<(), ReplError> {
        self.check_set(access.set)?;
        if access.way >= self.config.ways {
            return Err(ReplError::WayOutOfRange {
                way: access.way,
                ways: self.config.ways,
            });
        }

        self.stats.accesses += 1;
        if access.hit {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
        self.policy.update(&mut self.lines, access);
        Ok(())
    }

    /// Switches the active policy.
    ///
    /// Line metadata is kept. Switching to the contestant policy builds a
    /// fresh engine for this level; switching to the active policy is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ReplError::Allocation`] if engine storage cannot be allocated.
    pub fn set_policy(&mut self, kind: PolicyKind) -> Result<(), ReplError> {
        if kind == self.kind {
            return Ok(());
        }
        self.policy = PolicyWrapper::build(&self.config, kind, &self.map)?;
        debug!(from = ?self.kind, to = ?kind, "replacement policy switched");
        self.kind = kind;
        Ok(())
    }

    /// Switches the active policy by the host's numeric id.
    ///
    /// # Errors
    ///
    /// Returns [`ReplError::UnknownPolicy`] for an id outside 0..=2, otherwise
    /// the errors of [`ReplacementState::set_policy`].
    pub fn set_policy_id(&mut self, id: u32) -> Result<(), ReplError> {
        self.set_policy(PolicyKind::try_from(id)?)
    }

    /// Advances the reference timer.
    pub const fn increment_timer(&mut self) {
        self.stats.timer += 1;
    }

    /// Current reference timer value.
    pub const fn timer(&self) -> u64 {
        self.stats.timer
    }

    /// Snapshot of the statistics, including the active engine's counters.
    pub fn stats(&self) -> ReplacementStats {
        let mut stats = self.stats;
        self.policy.export_stats(&mut stats);
        stats
    }

    /// Configuration this state was built from.
    pub const fn config(&self) -> &ReplacementConfig {
        &self.config
    }

    /// Level this state belongs to.
    pub const fn level(&self) -> CacheLevel {
        self.config.level
    }

    /// Number of sets.
    pub const fn sets(&self) -> usize {
        self.config.sets
    }

    /// Associativity.
    pub const fn ways(&self) -> usize {
        self.config.ways
    }

    /// Active policy kind.
    pub const fn policy_kind(&self) -> PolicyKind {
        self.kind
    }

    /// Active algorithm after level gating.
    pub const fn policy(&self) -> &PolicyWrapper {
        &self.policy
    }

    /// Metadata of every line.
    pub const fn lines(&self) -> &LineStore {
        &self.lines
    }

    /// Metadata of every way in `set`, or `None` if `set` is out of range.
    pub fn set_lines(&self, set: usize) -> Option<&[LineMeta]> {
        (set < self.config.sets).then(|| self.lines.set(set))
    }

    /// Metadata of one line, or `None` if out of range.
    pub fn line(&self, set: usize, way: usize) -> Option<&LineMeta> {
        self.set_lines(set).and_then(|lines| lines.get(way))
    }

    /// Insertion-signature map handle used by this level.
    pub const fn signature_map(&self) -> &SignatureMap {
        &self.map
    }

    /// The SHiP engine, if it manages this level.
    pub const fn ship(&self) -> Option<&ShipPolicy> {
        match &self.policy {
            PolicyWrapper::Ship(p) => Some(p),
            _ => None,
        }
    }

    /// The RRIP engine, if it manages this level.
    pub const fn rrip(&self) -> Option<&RripPolicy> {
        match &self.policy {
            PolicyWrapper::Rrip(p) => Some(p),
            _ => None,
        }
    }

    /// The set-dueling engine, if it manages this level.
    pub const fn dueling(&self) -> Option<&SetDuelingPolicy> {
        match &self.policy {
            PolicyWrapper::SetDueling(p) => Some(p),
            _ => None,
        }
    }

    fn check_set(&self, set: usize) -> Result<(), ReplError> {
        if set >= self.config.sets {
            return Err(ReplError::SetOutOfRange {
                set,
                sets: self.config.sets,
            });
        }
        Ok(())
    }
}
