//! Least Recently Used (LRU) Replacement Policy.
//!
//! This policy evicts the cache line that has not been accessed for the longest time.
//! Each line carries its rank in the usage stack of its set. When a line is accessed,
//! it is moved to the top (Most Recently Used position, rank 0) and every line that was
//! above it moves down one rank. The line at rank `ways - 1` is the Least Recently Used.
//!
//! LRU is also the fallback of every contestant engine at the cache levels it
//! does not manage.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `update()`: O(W) where W is the number of ways (associativity)
//!   - `get_victim()`: O(W)
//! - **Space Complexity:** O(S × W) ranks, held in the shared line store
//! - **Best Case:** Workloads with strong temporal locality
//! - **Worst Case:** Scanning patterns larger than cache capacity (thrashing)

use super::ReplacementPolicy;
use crate::cache::meta::LineStore;
use crate::common::Access;

/// LRU Policy. All of its state is the stack rank stored per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LruPolicy;

impl LruPolicy {
    /// Creates a new LRU policy instance.
    pub const fn new() -> Self {
        Self
    }
}

impl ReplacementPolicy for LruPolicy {
    /// Promotes the accessed way to the MRU position, hit or fill alike.
    fn update(&mut self, lines: &mut LineStore, access: &Access) {
        lines.promote(access.set, access.way);
    }

    /// Returns the way at the bottom of the usage stack (LRU position).
    fn get_victim(&mut self, lines: &mut LineStore, set: usize) -> usize {
        lines.lru_way(set)
    }
}
