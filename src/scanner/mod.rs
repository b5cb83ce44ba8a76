//! Path traversal and candidate collection.
//!
//! The scanner resolves user-supplied paths into file records and feeds
//! them to the candidate pool. What counts as "discovered" is decided
//! here: symlink policy, recursion, hidden-file filtering and the
//! empty-file filter all live on this side of the engine boundary.

pub mod walker;

pub use walker::{read_paths, SymlinkMode, WalkStats, Walker, WalkerConfig};
