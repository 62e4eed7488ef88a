//! Multimap from rolling-hash value to the starting positions that produced
//! it, built once per (token list, window width) pair.

use fxhash::FxHashMap;
use smallvec::SmallVec;

/// A chained hashtable mapping hash values to the positions where that hash
/// occurred, insertion order preserved within a bucket.
#[derive(Debug, Clone, Default)]
pub struct HashIndex {
    buckets: FxHashMap<u32, SmallVec<[u32; 4]>>,
}

impl HashIndex {
    /// Sized to roughly `3 * expected_entries` buckets, matching the
    /// teacher's capacity-hint convention for hot maps.
    pub fn with_expected_entries(expected_entries: usize) -> Self {
        HashIndex {
            buckets: FxHashMap::with_capacity_and_hasher(
                expected_entries.saturating_mul(3).max(1),
                Default::default(),
            ),
        }
    }

    pub fn insert(&mut self, hash: u32, pos: u32) {
        self.buckets.entry(hash).or_default().push(pos);
    }

    /// Positions recorded for `hash`, in ascending insertion order; empty
    /// when absent.
    pub fn lookup(&self, hash: u32) -> &[u32] {
        self.buckets.get(&hash).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
