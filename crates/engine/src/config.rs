//! Configuration system for the replacement engine.
//!
//! This module defines all configuration structures and enums used to parameterize
//! one cache level's replacement state. It provides:
//! 1. **Defaults:** Baseline geometry and the tuning constants of each engine.
//! 2. **Structures:** Per-level config plus nested contestant, SHiP, RRIP, and dueling config.
//! 3. **Enums:** Policy kind, cache level, contestant engine, and engine variants.
//!
//! Configuration is supplied as JSON (`ReplacementConfig::from_json`/`from_path`) or
//! built in code from `ReplacementConfig::default()`.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::ReplError;

/// Default configuration constants for the replacement engine.
///
/// These values define the baseline hardware configuration when not
/// explicitly overridden in a JSON configuration document.
mod defaults {
    /// Default number of sets (1024).
    pub const SETS: usize = 1024;

    /// Default associativity (8 ways, a mid-level cache).
    pub const WAYS: usize = 8;

    /// Seed for the random policy's xorshift generator.
    pub const RANDOM_SEED: u64 = 123456789;

    /// Signature table entries (64 Ki). Signatures are `PC mod SHIP_TABLE_SIZE`.
    pub const SHIP_TABLE_SIZE: usize = 1 << 16;

    /// Saturation ceiling of each signature counter (3-bit counters, as in
    /// the SHiP paper's signature history counter table).
    pub const SHIP_COUNTER_MAX: u32 = 7;

    /// Low set-index bits inspected to classify leader sets (mask 511).
    pub const DUEL_LEADER_BITS: u32 = 9;

    /// Saturation ceiling of the global policy counter.
    pub const DUEL_COUNTER_MAX: u32 = 1023;

    /// Policy counter value above which followers switch to MRU insertion.
    pub const DUEL_THRESHOLD: u32 = 128;

    /// Initial value of each set's local insertion counter.
    pub const DUEL_LOCAL_INIT: u32 = 6;

    /// Value a local insertion counter is reloaded with after reaching zero.
    pub const DUEL_LOCAL_RESET: u32 = 2;
}

/// Replacement policy selected by the host.
///
/// Numeric ids follow the host's convention (see `TryFrom<u32>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum PolicyKind {
    /// True LRU stack replacement.
    #[default]
    #[serde(alias = "LRU")]
    Lru,
    /// Uniformly random victim selection.
    #[serde(alias = "RANDOM")]
    Random,
    /// The configured contestant engine (SHiP, RRIP, or set dueling).
    #[serde(alias = "CONTESTANT")]
    Contestant,
}

impl TryFrom<u32> for PolicyKind {
    type Error = ReplError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(Self::Lru),
            1 => Ok(Self::Random),
            2 => Ok(Self::Contestant),
            other => Err(ReplError::UnknownPolicy(other)),
        }
    }
}

/// Position of a cache in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum CacheLevel {
    /// First-level cache; sees the instruction pointer first.
    #[serde(alias = "l1")]
    L1,
    /// Second-level cache.
    #[default]
    #[serde(alias = "l2")]
    L2,
    /// Last-level cache.
    #[serde(alias = "l3")]
    L3,
}

/// Prediction engine used when the policy is [`PolicyKind::Contestant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ContestantEngine {
    /// Signature-based hit predictor layered on an LRU stack.
    #[default]
    #[serde(alias = "SHiP")]
    Ship,
    /// Static re-reference interval prediction.
    #[serde(alias = "RRIP")]
    Rrip,
    /// LRU vs MRU insertion chosen by set dueling.
    SetDueling,
}

/// Insertion rule of the SHiP engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ShipVariant {
    /// Promote an incoming line to MRU only when its signature counter is zero.
    #[default]
    V2,
    /// Promote an incoming line to MRU only when its signature counter is non-zero.
    Classic,
}

/// When the RRIP engine computes its victim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum VictimTiming {
    /// Search and age inside the victim-selection call.
    #[default]
    Immediate,
    /// Search and age during the miss update and park the result for the
    /// next victim-selection call on that set.
    Deferred,
}

/// Root configuration for one cache level's replacement state.
///
/// # Examples
///
/// ```
/// use replsim_core::config::{CacheLevel, ContestantEngine, PolicyKind, ReplacementConfig};
///
/// let json = r#"{
///     "sets": 2048,
///     "ways": 16,
///     "level": "L2",
///     "policy": "Contestant",
///     "contestant": {
///         "engine": "Rrip",
///         "managed_level": "L2"
///     }
/// }"#;
///
/// let config = ReplacementConfig::from_json(json).unwrap();
/// assert_eq!(config.sets, 2048);
/// assert_eq!(config.policy, PolicyKind::Contestant);
/// assert_eq!(config.contestant.engine, ContestantEngine::Rrip);
/// assert_eq!(config.contestant.feeder_level, CacheLevel::L1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReplacementConfig {
    /// Number of sets
    #[serde(default = "ReplacementConfig::default_sets")]
    pub sets: usize,

    /// Associativity (number of ways)
    #[serde(default = "ReplacementConfig::default_ways")]
    pub ways: usize,

    /// Which level of the hierarchy this state belongs to
    #[serde(default)]
    pub level: CacheLevel,

    /// Active replacement policy
    #[serde(default)]
    pub policy: PolicyKind,

    /// Seed for random replacement
    #[serde(default = "ReplacementConfig::default_random_seed")]
    pub random_seed: u64,

    /// Contestant engine selection and tuning
    #[serde(default)]
    pub contestant: ContestantConfig,
}

impl ReplacementConfig {
    /// Returns the default number of sets.
    fn default_sets() -> usize {
        defaults::SETS
    }

    /// Returns the default associativity.
    fn default_ways() -> usize {
        defaults::WAYS
    }

    /// Returns the default random seed.
    fn default_random_seed() -> u64 {
        defaults::RANDOM_SEED
    }

    /// Builds a configuration with the given geometry, level and policy and
    /// default contestant tuning.
    pub fn new(sets: usize, ways: usize, level: CacheLevel, policy: PolicyKind) -> Self {
        Self {
            sets,
            ways,
            level,
            policy,
            ..Self::default()
        }
    }

    /// Replaces the contestant engine, keeping its tuning.
    #[must_use]
    pub const fn with_engine(mut self, engine: ContestantEngine) -> Self {
        self.contestant.engine = engine;
        self
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ReplError::Parse`] on malformed JSON and
    /// [`ReplError::InvalidConfig`] if validation fails.
    pub fn from_json(json: &str) -> Result<Self, ReplError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ReplError::Io`] if the file cannot be read, otherwise the
    /// errors of [`ReplacementConfig::from_json`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReplError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Checks that the configuration describes a cache the engine can model.
    ///
    /// # Errors
    ///
    /// Returns [`ReplError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ReplError> {
        if self.sets == 0 {
            return Err(ReplError::InvalidConfig("sets must be non-zero".into()));
        }
        if self.ways == 0 {
            return Err(ReplError::InvalidConfig("ways must be non-zero".into()));
        }
        self.contestant.validate()
    }
}

impl Default for ReplacementConfig {
    /// Creates a default configuration: a 1024-set, 8-way L2 using LRU.
    fn default() -> Self {
        Self {
            sets: defaults::SETS,
            ways: defaults::WAYS,
            level: CacheLevel::default(),
            policy: PolicyKind::default(),
            random_seed: defaults::RANDOM_SEED,
            contestant: ContestantConfig::default(),
        }
    }
}

/// Contestant engine selection and per-engine tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContestantConfig {
    /// Engine active whenever the policy is `Contestant`
    #[serde(default)]
    pub engine: ContestantEngine,

    /// Level at which the engine runs; every other level uses LRU
    #[serde(default = "ContestantConfig::default_managed_level")]
    pub managed_level: CacheLevel,

    /// Level that records insertion signatures for SHiP
    #[serde(default = "ContestantConfig::default_feeder_level")]
    pub feeder_level: CacheLevel,

    /// SHiP tuning
    #[serde(default)]
    pub ship: ShipConfig,

    /// RRIP tuning
    #[serde(default)]
    pub rrip: RripConfig,

    /// Set-dueling tuning
    #[serde(default)]
    pub dueling: DuelingConfig,
}

impl ContestantConfig {
    /// Returns the default managed level (L2).
    fn default_managed_level() -> CacheLevel {
        CacheLevel::L2
    }

    /// Returns the default SHiP feeder level (L1).
    fn default_feeder_level() -> CacheLevel {
        CacheLevel::L1
    }

    fn validate(&self) -> Result<(), ReplError> {
        if self.engine == ContestantEngine::Ship && self.feeder_level == self.managed_level {
            return Err(ReplError::InvalidConfig(format!(
                "SHiP feeder level and managed level are both {:?}",
                self.managed_level
            )));
        }
        self.ship.validate()?;
        self.dueling.validate()
    }
}

impl Default for ContestantConfig {
    fn default() -> Self {
        Self {
            engine: ContestantEngine::default(),
            managed_level: CacheLevel::L2,
            feeder_level: CacheLevel::L1,
            ship: ShipConfig::default(),
            rrip: RripConfig::default(),
            dueling: DuelingConfig::default(),
        }
    }
}

/// SHiP signature table configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShipConfig {
    /// Number of signature counters
    #[serde(default = "ShipConfig::default_table_size")]
    pub table_size: usize,

    /// Saturation ceiling of each counter
    #[serde(default = "ShipConfig::default_counter_max")]
    pub counter_max: u32,

    /// Insertion rule
    #[serde(default)]
    pub variant: ShipVariant,
}

impl ShipConfig {
    /// Returns the default signature table size.
    fn default_table_size() -> usize {
        defaults::SHIP_TABLE_SIZE
    }

    /// Returns the default counter ceiling.
    fn default_counter_max() -> u32 {
        defaults::SHIP_COUNTER_MAX
    }

    fn validate(&self) -> Result<(), ReplError> {
        if self.table_size == 0 {
            return Err(ReplError::InvalidConfig(
                "ship.table_size must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            table_size: defaults::SHIP_TABLE_SIZE,
            counter_max: defaults::SHIP_COUNTER_MAX,
            variant: ShipVariant::default(),
        }
    }
}

/// RRIP configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RripConfig {
    /// When victims are computed
    #[serde(default)]
    pub victim_timing: VictimTiming,
}

/// Set-dueling configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DuelingConfig {
    /// Low set-index bits that classify leader sets
    #[serde(default = "DuelingConfig::default_leader_bits")]
    pub leader_bits: u32,

    /// Saturation ceiling of the global policy counter
    #[serde(default = "DuelingConfig::default_counter_max")]
    pub counter_max: u32,

    /// Policy counter value above which followers use MRU insertion
    #[serde(default = "DuelingConfig::default_threshold")]
    pub threshold: u32,

    /// Initial local insertion counter of every set
    #[serde(default = "DuelingConfig::default_local_init")]
    pub local_counter_init: u32,

    /// Reload value of a local insertion counter that reached zero
    #[serde(default = "DuelingConfig::default_local_reset")]
    pub local_counter_reset: u32,
}

impl DuelingConfig {
    /// Returns the default leader-classification width.
    fn default_leader_bits() -> u32 {
        defaults::DUEL_LEADER_BITS
    }

    /// Returns the default policy counter ceiling.
    fn default_counter_max() -> u32 {
        defaults::DUEL_COUNTER_MAX
    }

    /// Returns the default MRU threshold.
    fn default_threshold() -> u32 {
        defaults::DUEL_THRESHOLD
    }

    /// Returns the default initial local counter.
    fn default_local_init() -> u32 {
        defaults::DUEL_LOCAL_INIT
    }

    /// Returns the default local counter reload value.
    fn default_local_reset() -> u32 {
        defaults::DUEL_LOCAL_RESET
    }

    /// Mask selecting the leader-classification bits of a set index.
    ///
    /// A width of `usize::BITS` or more selects every bit.
    pub const fn leader_mask(&self) -> usize {
        match 1usize.checked_shl(self.leader_bits) {
            Some(bit) => bit - 1,
            None => usize::MAX,
        }
    }

    fn validate(&self) -> Result<(), ReplError> {
        if self.leader_bits == 0 || self.leader_bits >= usize::BITS {
            return Err(ReplError::InvalidConfig(format!(
                "dueling.leader_bits must be in 1..{}, got {}",
                usize::BITS,
                self.leader_bits
            )));
        }
        if self.threshold >= self.counter_max {
            return Err(ReplError::InvalidConfig(format!(
                "dueling.threshold {} must be below dueling.counter_max {}",
                self.threshold, self.counter_max
            )));
        }
        if self.local_counter_reset == 0 {
            return Err(ReplError::InvalidConfig(
                "dueling.local_counter_reset must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for DuelingConfig {
    fn default() -> Self {
        Self {
            leader_bits: defaults::DUEL_LEADER_BITS,
            counter_max: defaults::DUEL_COUNTER_MAX,
            threshold: defaults::DUEL_THRESHOLD,
            local_counter_init: defaults::DUEL_LOCAL_INIT,
            local_counter_reset: defaults::DUEL_LOCAL_RESET,
        }
    }
}
