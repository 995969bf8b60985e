//! Replacement statistics collection and reporting.
//!
//! This module tracks the activity of one cache level's replacement state. It provides:
//! 1. **Traffic:** Reference timer, accesses, hits, misses, and victim selections.
//! 2. **Insertion:** How filled lines entered the LRU stack (promoted or MRU-inserted).
//! 3. **Prediction:** Signature-map fallbacks (SHiP) and ageing passes (RRIP).

use std::fmt;

/// Replacement statistics for one cache level.
///
/// Engine-specific counters stay zero when that engine is not active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplacementStats {
    /// References counted by the host through `increment_timer`.
    pub timer: u64,
    /// Accesses reported through `update`.
    pub accesses: u64,
    /// Accesses that hit.
    pub hits: u64,
    /// Accesses that filled a line.
    pub misses: u64,
    /// Victim-selection calls answered.
    pub victims: u64,
    /// Fills promoted to MRU by SHiP or set dueling.
    pub promoted_insertions: u64,
    /// Fills inserted at the LRU position by set dueling.
    pub mru_insertions: u64,
    /// SHiP fills whose insertion signature had to fall back to the access PC.
    pub signature_map_misses: u64,
    /// Whole-set ageing steps taken by RRIP victim searches.
    pub aging_passes: u64,
}

impl ReplacementStats {
    /// Fraction of accesses that hit, or 0 before the first access.
    pub fn hit_rate(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            self.hits as f64 / self.accesses as f64
        }
    }

    /// Prints the report to stdout.
    pub fn print(&self) {
        println!("{self}");
    }
}

impl fmt::Display for ReplacementStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "==========================================================")?;
        writeln!(f, "REPLACEMENT POLICY STATISTICS")?;
        writeln!(f, "==========================================================")?;
        writeln!(f, "repl.timer               {}", self.timer)?;
        writeln!(f, "repl.accesses            {}", self.accesses)?;
        writeln!(f, "repl.hits                {}", self.hits)?;
        writeln!(f, "repl.misses              {}", self.misses)?;
        writeln!(f, "repl.hit_rate            {:.2}%", self.hit_rate() * 100.0)?;
        writeln!(f, "repl.victims             {}", self.victims)?;
        writeln!(f, "----------------------------------------------------------")?;
        writeln!(f, "insert.promoted          {}", self.promoted_insertions)?;
        writeln!(f, "insert.mru               {}", self.mru_insertions)?;
        writeln!(f, "ship.sig_map_misses      {}", self.signature_map_misses)?;
        writeln!(f, "rrip.aging_passes        {}", self.aging_passes)?;
        write!(f, "==========================================================")
    }
}
