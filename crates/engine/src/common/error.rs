//! Replacement engine error definitions.
//!
//! This module defines the errors surfaced to the host simulator. It covers:
//! 1. **Construction:** Invalid geometry or configuration and storage allocation failure.
//! 2. **Per-access contract:** Set, way, and candidate-slice validation.
//! 3. **Host input:** Unknown numeric policy or access type ids, JSON decoding, and file I/O.

use std::collections::TryReserveError;

use thiserror::Error;

/// Errors returned by the replacement engine.
///
/// Saturating counters clamping at their bounds is normal operation and is
/// never reported through this type.
#[derive(Debug, Error)]
pub enum ReplError {
    /// The configuration describes a cache the engine cannot model.
    ///
    /// The associated value names the offending field and why it was rejected.
    #[error("invalid replacement configuration: {0}")]
    InvalidConfig(String),

    /// Per-set or per-way storage could not be allocated.
    #[error("failed to allocate replacement state for {what}: {source}")]
    Allocation {
        /// Which structure was being allocated.
        what: &'static str,
        /// The allocator failure.
        #[source]
        source: TryReserveError,
    },

    /// A set index outside `[0, sets)` was passed by the host.
    #[error("set index {set} out of range (cache has {sets} sets)")]
    SetOutOfRange {
        /// The set index supplied by the host.
        set: usize,
        /// Number of sets in this cache level.
        sets: usize,
    },

    /// A way index outside `[0, ways)` was passed by the host.
    #[error("way index {way} out of range (cache is {ways}-way associative)")]
    WayOutOfRange {
        /// The way index supplied by the host.
        way: usize,
        /// Associativity of this cache level.
        ways: usize,
    },

    /// The candidate line slice passed to victim selection does not cover the set.
    #[error("victim candidates cover {found} ways, expected {expected}")]
    CandidateMismatch {
        /// Associativity of this cache level.
        expected: usize,
        /// Length of the slice supplied by the host.
        found: usize,
    },

    /// The host passed a numeric policy id with no corresponding policy.
    #[error("unknown replacement policy id {0}")]
    UnknownPolicy(u32),

    /// The host passed a numeric access type with no corresponding kind.
    #[error("unknown access type id {0}")]
    UnknownAccessType(u32),

    /// The configuration document could not be decoded.
    #[error("failed to parse replacement configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("failed to read replacement configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl ReplError {
    /// Wraps an allocation failure for the named structure.
    pub(crate) const fn allocation(what: &'static str, source: TryReserveError) -> Self {
        Self::Allocation { what, source }
    }
}
