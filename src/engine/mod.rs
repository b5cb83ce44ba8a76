//! The duplicate-detection engine.
//!
//! # Architecture
//!
//! The engine is built from four pieces, leaf first:
//!
//! - [`record`]: per-file metadata plus lazily computed comparison
//!   artifacts (sample, digest) and the record lifecycle states.
//! - [`pool`]: the size-bucketed candidate pool restricting comparison
//!   work to files that could possibly match.
//! - [`compare`]: the staged equality test, escalating from free checks
//!   (size, physical identity) through sampling to digest or full-content
//!   comparison.
//! - [`cluster`]: the per-bucket pairwise scan that groups records into
//!   clusters and feeds them to a [`crate::report::Reporter`].
//!
//! The engine is single-threaded and synchronous; all state lives in
//! memory for one run, owned tree-style: pool owns buckets, buckets own
//! records, records own their buffers.

pub mod cluster;
pub mod compare;
pub mod pool;
pub mod record;

pub use cluster::{Cluster, ClusterBuilder, ScanStats};
pub use compare::Comparator;
pub use pool::{CandidatePool, BUCKET_COUNT, HASH_BITS};
pub use record::{file_identity, FileId, FileRecord, ReadError, Status, SAMPLE_SIZE};
