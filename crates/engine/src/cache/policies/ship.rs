//! Signature-based Hit Predictor (SHiP).
//!
//! SHiP predicts, per static instruction, whether the lines that instruction
//! brings into the cache tend to be reused. Each instruction pointer is folded
//! into a signature (`PC mod table_size`) that indexes a table of saturating
//! counters:
//!
//! - a hit on a line credits the signature that inserted it;
//! - evicting a line that was never hit debits the signature that inserted it.
//!
//! The prediction only steers *insertion*: eviction order is the LRU stack.
//! With the default [`ShipVariant::V2`] rule an incoming line is promoted to MRU
//! only when its signature counter is zero; otherwise it is left where the
//! victim was and the stack is untouched. [`ShipVariant::Classic`] inverts the
//! test.
//!
//! The signature of an incoming line is the one recorded by the feeder level
//! (the level that first sees the instruction pointer) in the shared
//! [`SignatureMap`], keyed by `(tag, set)`. Each record is consumed by the
//! next managed-level access to that line, hit or fill.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, trace};

use super::ReplacementPolicy;
use crate::cache::meta::LineStore;
use crate::common::{Access, ReplError};
use crate::config::{ShipConfig, ShipVariant};
use crate::stats::ReplacementStats;

/// Table of saturating reuse counters indexed by signature.
#[derive(Debug, Clone)]
pub struct SignatureTable {
    counters: Vec<u32>,
    max: u32,
}

impl SignatureTable {
    /// Creates a table of `size` counters, all zero, saturating at `max`.
    ///
    /// # Errors
    ///
    /// Returns [`ReplError::Allocation`] if the table cannot be allocated.
    pub fn new(size: usize, max: u32) -> Result<Self, ReplError> {
        let mut counters = Vec::new();
        counters
            .try_reserve_exact(size)
            .map_err(|e| ReplError::allocation("signature table", e))?;
        counters.resize(size, 0);
        Ok(Self { counters, max })
    }

    /// Number of counters.
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// Whether the table has no counters.
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Saturation ceiling.
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Current counter for `signature`.
    pub fn get(&self, signature: u64) -> u32 {
        self.counters[self.slot(signature)]
    }

    /// Credits `signature`, saturating at the ceiling.
    pub fn increment(&mut self, signature: u64) {
        let slot = self.slot(signature);
        if self.counters[slot] < self.max {
            self.counters[slot] += 1;
        }
    }

    /// Debits `signature`, saturating at zero.
    pub fn decrement(&mut self, signature: u64) {
        let slot = self.slot(signature);
        self.counters[slot] = self.counters[slot].saturating_sub(1);
    }

    // Signatures recorded by a feeder with a larger table are folded again.
    fn slot(&self, signature: u64) -> usize {
        (signature % self.counters.len() as u64) as usize
    }
}

/// Insertion-time signatures keyed by `(tag, set)`, shared between the feeder
/// level that records them and the SHiP level that consumes them.
///
/// Cloning the handle shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct SignatureMap {
    inner: Arc<Mutex<HashMap<(u64, usize), u64>>>,
}

impl SignatureMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the signature that inserted the line `(tag, set)`, replacing any
    /// earlier record for the same line.
    pub fn record(&self, tag: u64, set: usize, signature: u64) {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = map.insert((tag, set), signature);
    }

    /// Signature recorded for `(tag, set)`, if the feeder ever saw that line.
    pub fn lookup(&self, tag: u64, set: usize) -> Option<u64> {
        let map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.get(&(tag, set)).copied()
    }

    /// Removes and returns the signature recorded for `(tag, set)`.
    ///
    /// The managed level consumes each record on its next access to the line,
    /// so the map holds only lines the feeder has seen since then.
    pub fn take(&self, tag: u64, set: usize) -> Option<u64> {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.remove(&(tag, set))
    }

    /// Number of recorded lines.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// SHiP behaviour at the feeder level: record the signature of every access,
/// then update the LRU stack as usual.
#[derive(Debug, Clone)]
pub struct ShipFeeder {
    map: SignatureMap,
    table_size: usize,
}

impl ShipFeeder {
    /// Creates a feeder recording signatures for a table of `table_size` entries.
    pub const fn new(map: SignatureMap, table_size: usize) -> Self {
        Self { map, table_size }
    }
}

impl ReplacementPolicy for ShipFeeder {
    fn update(&mut self, lines: &mut LineStore, access: &Access) {
        let signature = access.pc.signature(self.table_size);
        self.map.record(access.line.tag, access.set, signature);
        lines.promote(access.set, access.way);
    }

    fn get_victim(&mut self, lines: &mut LineStore, set: usize) -> usize {
        lines.lru_way(set)
    }
}

/// SHiP behaviour at the managed level.
#[derive(Debug, Clone)]
pub struct ShipPolicy {
    table: SignatureTable,
    map: SignatureMap,
    variant: ShipVariant,
    map_misses: u64,
    promoted_insertions: u64,
}

impl ShipPolicy {
    /// Creates the managed-level engine reading insertion signatures from `map`.
    ///
    /// # Errors
    ///
    /// Returns [`ReplError::Allocation`] if the signature table cannot be allocated.
    pub fn new(config: &ShipConfig, map: SignatureMap) -> Result<Self, ReplError> {
        Ok(Self {
            table: SignatureTable::new(config.table_size, config.counter_max)?,
            map,
            variant: config.variant,
            map_misses: 0,
            promoted_insertions: 0,
        })
    }

    /// The signature counter table.
    pub const fn table(&self) -> &SignatureTable {
        &self.table
    }

    /// The shared insertion-signature map.
    pub const fn map(&self) -> &SignatureMap {
        &self.map
    }

    /// Resolves the signature of the line being filled, consuming its record.
    ///
    /// A line the feeder never recorded (the feeder is absent, or the host
    /// filled this level directly) is attributed to the PC of the current
    /// access.
    fn incoming_signature(&mut self, access: &Access) -> u64 {
        if let Some(signature) = self.map.take(access.line.tag, access.set) {
            return signature;
        }
        self.map_misses += 1;
        let fallback = access.pc.signature(self.table.len());
        debug!(
            set = access.set,
            tag = access.line.tag,
            fallback,
            "no insertion signature recorded, using access PC"
        );
        fallback
    }

    fn should_promote(&self, signature: u64) -> bool {
        let cold = self.table.get(signature) == 0;
        match self.variant {
            ShipVariant::V2 => cold,
            ShipVariant::Classic => !cold,
        }
    }
}

impl ReplacementPolicy for ShipPolicy {
    fn update(&mut self, lines: &mut LineStore, access: &Access) {
        let (set, way) = (access.set, access.way);

        if access.hit {
            // A hit trains on the stored signature; the record is only dropped.
            let _ = self.map.take(access.line.tag, set);
            let line = lines.line_mut(set, way);
            self.table.increment(line.signature);
            line.reused = true;
            trace!(set, way, signature = line.signature, "ship hit");
            return;
        }

        let incoming = self.incoming_signature(access);
        let line = lines.line_mut(set, way);
        if !line.reused {
            self.table.decrement(line.signature);
        }
        line.reused = false;
        line.signature = incoming;

        let promote = self.should_promote(incoming);
        trace!(set, way, signature = incoming, promote, "ship fill");
        if promote {
            self.promoted_insertions += 1;
            lines.promote(set, way);
        }
    }

    /// Eviction order is the LRU stack.
    fn get_victim(&mut self, lines: &mut LineStore, set: usize) -> usize {
        lines.lru_way(set)
    }

    fn export_stats(&self, stats: &mut ReplacementStats) {
        stats.signature_map_misses = self.map_misses;
        stats.promoted_insertions = self.promoted_insertions;
    }
}
