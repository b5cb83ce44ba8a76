//! Directory walking and file collection.
//!
//! # Overview
//!
//! The [`Walker`] accepts one path at a time (command-line argument or a
//! line read from stdin), stats it, and either inserts a file record into
//! the candidate pool or recurses into a directory tree via [`walkdir`].
//! Directories already visited in this run (by device and inode) are
//! skipped, so overlapping arguments do not collect files twice.
//!
//! Traversal problems are warnings, never fatal: an unreadable directory
//! or a vanished file is logged and skipped, and the run continues.

use std::collections::HashSet;
use std::fs::{self, Metadata};
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::engine::{file_identity, CandidatePool, FileId, FileRecord};

/// Symlink dereferencing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymlinkMode {
    /// Never dereference symlinks (default).
    #[default]
    Never,
    /// Dereference only symlinks given on the command line.
    CommandLine,
    /// Dereference every symlink encountered.
    Always,
}

/// Configuration for path traversal.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Recurse into directories.
    pub recursive: bool,
    /// Include hidden files and directories (names starting with `.`).
    pub all_files: bool,
    /// Symlink dereferencing policy.
    pub symlinks: SymlinkMode,
    /// Skip zero-length files before insertion.
    pub ignore_empty: bool,
    /// Collect each physical file only once (skip extra hard links).
    pub physical: bool,
}

/// Statistics from a traversal run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Records inserted into the pool
    pub files: usize,
    /// Total bytes across inserted records
    pub total_bytes: u64,
    /// Hard links skipped in physical mode
    pub skipped_physical: usize,
}

/// Collects file records into a candidate pool.
pub struct Walker<'p> {
    config: WalkerConfig,
    pool: &'p mut CandidatePool,
    visited_dirs: HashSet<FileId>,
    stats: WalkStats,
}

impl<'p> Walker<'p> {
    /// Create a walker feeding the given pool.
    pub fn new(pool: &'p mut CandidatePool, config: WalkerConfig) -> Self {
        Self {
            config,
            pool,
            visited_dirs: HashSet::new(),
            stats: WalkStats::default(),
        }
    }

    /// Process one top-level path.
    ///
    /// Regular files are collected; directories are recursed into when
    /// recursion is enabled and warned about otherwise; symlinks follow
    /// the configured policy; anything else is warned about and skipped.
    pub fn process_path(&mut self, path: &Path) {
        let meta = match fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(e) => {
                log::warn!("{}: {}", path.display(), e);
                return;
            }
        };

        let meta = if meta.file_type().is_symlink() {
            match self.config.symlinks {
                SymlinkMode::Never => {
                    log::debug!("{}: symbolic link; skipping", path.display());
                    return;
                }
                SymlinkMode::CommandLine | SymlinkMode::Always => {
                    match fs::metadata(path) {
                        Ok(meta) => meta,
                        Err(e) => {
                            log::warn!("{}: {}", path.display(), e);
                            return;
                        }
                    }
                }
            }
        } else {
            meta
        };

        if meta.is_file() {
            self.collect_file(path, &meta);
        } else if meta.is_dir() {
            if self.config.recursive {
                self.walk_directory(path);
            } else {
                log::warn!(
                    "{}: is a directory; skipping (use --recursive)",
                    path.display()
                );
            }
        } else {
            log::warn!("{}: not a regular file; skipping", path.display());
        }
    }

    /// Consume the walker, returning its statistics.
    #[must_use]
    pub fn into_stats(self) -> WalkStats {
        self.stats
    }

    fn walk_directory(&mut self, path: &Path) {
        let follow = self.config.symlinks == SymlinkMode::Always;
        let mut it = WalkDir::new(path).follow_links(follow).into_iter();

        while let Some(entry) = it.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("{}", e);
                    continue;
                }
            };

            if entry.depth() > 0 && !self.config.all_files && is_hidden(&entry) {
                if entry.file_type().is_dir() {
                    it.skip_current_dir();
                }
                continue;
            }

            if entry.file_type().is_dir() {
                // Skip whole subtrees already seen through another path.
                if let Ok(meta) = entry.metadata() {
                    if let Some(id) = file_identity(&meta) {
                        if !self.visited_dirs.insert(id) {
                            log::debug!(
                                "{}: directory already visited; skipping",
                                entry.path().display()
                            );
                            it.skip_current_dir();
                        }
                    }
                }
                continue;
            }

            if entry.file_type().is_file() {
                match entry.metadata() {
                    Ok(meta) => self.collect_file(entry.path(), &meta),
                    Err(e) => log::warn!("{}: {}", entry.path().display(), e),
                }
            } else if entry.file_type().is_symlink() {
                log::trace!("{}: symbolic link; skipping", entry.path().display());
            } else {
                log::warn!("{}: not a regular file; skipping", entry.path().display());
            }
        }
    }

    fn collect_file(&mut self, path: &Path, meta: &Metadata) {
        if meta.len() == 0 && self.config.ignore_empty {
            log::trace!("{}: empty file; skipping", path.display());
            return;
        }

        let record = FileRecord::from_metadata(path, meta);

        if self.config.physical {
            if let Some(id) = record.id {
                if self.pool.contains_physical(record.size, id) {
                    log::debug!("{}: extra hard link; skipping", path.display());
                    self.stats.skipped_physical += 1;
                    return;
                }
            }
        }

        self.stats.files += 1;
        self.stats.total_bytes += record.size;
        self.pool.insert(record);
    }
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

/// Read paths from a stream, one per `terminator`-separated field.
///
/// Used when no paths are given on the command line; blank fields are
/// skipped. The terminator matches the output terminator, so a
/// null-terminated listing can be piped back in unchanged.
pub fn read_paths<R: BufRead>(reader: R, terminator: u8) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for field in reader.split(terminator) {
        let field = field?;
        let text = String::from_utf8_lossy(&field);
        let trimmed = if terminator == b'\n' {
            text.trim_end_matches('\r')
        } else {
            &text
        };
        if !trimmed.is_empty() {
            paths.push(PathBuf::from(trimmed));
        }
    }
    Ok(paths)
}
