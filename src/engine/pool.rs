//! Size-bucketed candidate pool.
//!
//! Bucketing by file size is the single cheapest discriminator available:
//! files of different size can never be duplicates, so restricting the
//! pairwise scan to one bucket at a time prunes the worst-case quadratic
//! comparison count down to quadratic within small same-size groups.
//!
//! The bucket index is the low bits of the size, not a mixed hash. Sizes
//! that share their low `HASH_BITS` bits collide; that weakens pruning but
//! never correctness, and it keeps bucket traversal order stable.

use std::mem;

use super::record::{FileId, FileRecord};

/// Number of low size bits used for bucket selection.
pub const HASH_BITS: u32 = 10;

/// Number of buckets in the pool.
pub const BUCKET_COUNT: usize = 1 << HASH_BITS;

/// All discovered regular files, partitioned by size bucket.
///
/// Insertion order within a bucket is preserved; it is the only order the
/// cluster builder ever relies on (the first-seen file becomes the cluster
/// head).
#[derive(Debug)]
pub struct CandidatePool {
    buckets: Vec<Vec<FileRecord>>,
    len: usize,
}

impl Default for CandidatePool {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidatePool {
    /// Create an empty pool with all `BUCKET_COUNT` buckets allocated.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buckets: vec![Vec::new(); BUCKET_COUNT],
            len: 0,
        }
    }

    /// Bucket index for a file size: low-bit masking.
    #[must_use]
    pub fn bucket_index(size: u64) -> usize {
        (size as usize) & (BUCKET_COUNT - 1)
    }

    /// Append a record to its size bucket.
    pub fn insert(&mut self, record: FileRecord) {
        self.buckets[Self::bucket_index(record.size)].push(record);
        self.len += 1;
    }

    /// Whether a record with this size and identity is already pooled.
    ///
    /// Only the destination bucket needs scanning, since an identical size
    /// always lands in the same bucket. Used by physical mode to avoid
    /// collecting the same on-disk file twice through hard links.
    #[must_use]
    pub fn contains_physical(&self, size: u64, id: FileId) -> bool {
        self.buckets[Self::bucket_index(size)]
            .iter()
            .any(|r| r.size == size && r.id == Some(id))
    }

    /// Total number of pooled records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the pool holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drain the buckets in index order.
    ///
    /// Each bucket is moved out and replaced with an empty one, so a fully
    /// processed bucket (and every record in it that was never claimed by a
    /// cluster) is freed before the next bucket is touched. This bounds
    /// peak memory during cluster building.
    pub fn drain_buckets(&mut self) -> impl Iterator<Item = Vec<FileRecord>> + '_ {
        self.len = 0;
        self.buckets.iter_mut().map(mem::take)
    }
}
