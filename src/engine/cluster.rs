//! Cluster formation within size buckets.
//!
//! # Overview
//!
//! The builder drains the candidate pool bucket by bucket, in bucket-index
//! order, and runs an insertion-ordered pairwise scan inside each bucket:
//! every still-unclaimed record gets a turn as cluster head and is compared
//! against every unclaimed record after it. Matches are absorbed into the
//! head's cluster and marked duplicate so they are never compared again.
//!
//! A head that turns invalid mid-scan stops accumulating partners, but the
//! records it never reached are not lost: the outer scan still visits each
//! of them as a head of its own.
//!
//! Worst case this is quadratic per bucket, but the comparator's early
//! rejection stages keep almost every pair cheap in practice.

use std::io;
use std::mem;

use bytesize::ByteSize;

use crate::report::Reporter;

use super::compare::Comparator;
use super::pool::CandidatePool;
use super::record::{FileRecord, Status};

/// A completed cluster: two or more mutually identical files.
///
/// The first record is the head (the first-seen file in bucket insertion
/// order). In excess mode everything but the head is reported.
#[derive(Debug, Clone)]
pub struct Cluster {
    /// 1-based cluster index, monotonically increasing across the run.
    pub index: usize,
    /// Members in discovery order; always at least two.
    pub records: Vec<FileRecord>,
}

impl Cluster {
    /// The first-seen member.
    #[must_use]
    pub fn head(&self) -> &FileRecord {
        debug_assert!(!self.records.is_empty());
        &self.records[0]
    }

    /// Mutable access to the head, used to materialize its digest for
    /// header output.
    pub fn head_mut(&mut self) -> &mut FileRecord {
        debug_assert!(!self.records.is_empty());
        &mut self.records[0]
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the cluster has no members (never true for reported ones).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Size shared by every member, in bytes.
    #[must_use]
    pub fn file_size(&self) -> u64 {
        self.records.first().map_or(0, |r| r.size)
    }

    /// Whether all members are the same physical file (hard links).
    #[must_use]
    pub fn single_physical_identity(&self) -> bool {
        match self.records.first().and_then(|r| r.id) {
            Some(id) => self.records.iter().all(|r| r.id == Some(id)),
            None => false,
        }
    }
}

/// Statistics from a cluster or unique scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Number of clusters formed (including suppressed hard-link clusters)
    pub clusters: usize,
    /// Total records absorbed into clusters
    pub duplicate_files: usize,
    /// Records excluded by read errors
    pub invalid_files: usize,
    /// Records reported in unique mode
    pub unique_files: usize,
    /// Bytes held by duplicate copies beyond one per cluster
    pub wasted_bytes: u64,
}

impl ScanStats {
    /// Human-readable reclaimable space.
    #[must_use]
    pub fn wasted_display(&self) -> String {
        ByteSize(self.wasted_bytes).to_string()
    }
}

/// Groups mutually equal records into clusters, bucket by bucket.
pub struct ClusterBuilder<'r, R: Reporter> {
    comparator: Comparator,
    reporter: &'r mut R,
    suppress_hardlink_clusters: bool,
    next_index: usize,
    stats: ScanStats,
}

impl<'r, R: Reporter> ClusterBuilder<'r, R> {
    /// Create a builder around a comparator and a reporter.
    pub fn new(comparator: Comparator, reporter: &'r mut R) -> Self {
        Self {
            comparator,
            reporter,
            suppress_hardlink_clusters: false,
            next_index: 1,
            stats: ScanStats::default(),
        }
    }

    /// Suppress clusters whose members are all one physical file.
    ///
    /// Such clusters occupy no extra disk space; suppressed clusters still
    /// consume an index so numbering matches a non-suppressed run.
    #[must_use]
    pub fn with_suppress_hardlink_clusters(mut self, suppress: bool) -> Self {
        self.suppress_hardlink_clusters = suppress;
        self
    }

    /// Find and report every duplicate cluster in the pool.
    ///
    /// Buckets are processed and freed one at a time; clusters are handed
    /// to the reporter in bucket-index order and, within a bucket, in
    /// insertion order of their heads.
    pub fn find_clusters(mut self, pool: &mut CandidatePool) -> io::Result<ScanStats> {
        for mut bucket in pool.drain_buckets() {
            self.scan_bucket(&mut bucket)?;
            self.stats.invalid_files += count_invalid(&bucket);
        }
        log::info!(
            "found {} clusters with {} duplicate files ({} reclaimable)",
            self.stats.clusters,
            self.stats.duplicate_files,
            self.stats.wasted_display()
        );
        Ok(self.stats)
    }

    /// Find and report every file that belongs to no cluster.
    ///
    /// Runs the identical pairwise pass but reports the complement: every
    /// record that is neither invalid nor claimed after the full scan.
    pub fn find_uniques(mut self, pool: &mut CandidatePool) -> io::Result<ScanStats> {
        for mut bucket in pool.drain_buckets() {
            self.scan_bucket_for_uniques(&mut bucket)?;
            self.stats.invalid_files += count_invalid(&bucket);
        }
        log::info!("found {} unique files", self.stats.unique_files);
        Ok(self.stats)
    }

    fn scan_bucket(&mut self, files: &mut [FileRecord]) -> io::Result<()> {
        // A single record cannot cluster with anything.
        if files.len() < 2 {
            return Ok(());
        }

        for first in 0..files.len() {
            if !files[first].is_candidate() {
                continue;
            }

            let mut members: Vec<usize> = Vec::new();

            for second in first + 1..files.len() {
                if !files[second].is_candidate() {
                    continue;
                }

                let (head, tail) = files.split_at_mut(second);
                if self.comparator.compare(&mut head[first], &mut tail[0]) {
                    if members.is_empty() {
                        head[first].set_duplicate();
                        members.push(first);
                    }
                    tail[0].set_duplicate();
                    members.push(second);
                } else if head[first].status() == Status::Invalid {
                    // Dead head: no point scanning further partners. The
                    // skipped records each get their own turn as head.
                    break;
                }
            }

            if !members.is_empty() {
                // Members move into the cluster; the vacated slots are
                // tombstones no later scan will touch.
                let records: Vec<FileRecord> = members
                    .iter()
                    .map(|&i| mem::replace(&mut files[i], FileRecord::taken()))
                    .collect();
                let mut cluster = Cluster {
                    index: self.next_index,
                    records,
                };
                self.next_index += 1;

                self.stats.clusters += 1;
                self.stats.duplicate_files += cluster.len();
                self.stats.wasted_bytes +=
                    cluster.file_size() * (cluster.len() as u64 - 1);

                if self.suppress_hardlink_clusters && cluster.single_physical_identity() {
                    log::debug!(
                        "cluster {} is a single physical file; suppressed",
                        cluster.index
                    );
                } else {
                    self.reporter.report_cluster(&mut cluster)?;
                }
            }
        }

        Ok(())
    }

    fn scan_bucket_for_uniques(&mut self, files: &mut [FileRecord]) -> io::Result<()> {
        for first in 0..files.len() {
            if !files[first].is_candidate() {
                continue;
            }

            for second in first + 1..files.len() {
                if !files[second].is_candidate() {
                    continue;
                }

                let (head, tail) = files.split_at_mut(second);
                if self.comparator.compare(&mut head[first], &mut tail[0]) {
                    head[first].set_duplicate();
                    tail[0].set_duplicate();
                } else if head[first].status() == Status::Invalid {
                    // Dead head: stop probing it against the rest.
                    break;
                }
            }

            if files[first].is_candidate() {
                self.reporter.report_unique(&files[first])?;
                self.stats.unique_files += 1;
            }
        }

        Ok(())
    }
}

fn count_invalid(files: &[FileRecord]) -> usize {
    files
        .iter()
        .filter(|r| r.status() == Status::Invalid)
        .count()
}
