//! Per-file records with lazily computed comparison artifacts.
//!
//! A [`FileRecord`] carries the metadata captured at discovery time (path,
//! size, filesystem identity) plus two lazily populated buffers: a short
//! content sample and a full-content digest. Both are computed at most once
//! per record; any read failure marks the record [`Status::Invalid`], which
//! permanently excludes it from comparison and output.

use std::fs::{File, Metadata};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::digest::DigestKind;

/// Number of leading bytes cached for the sampling stage.
pub const SAMPLE_SIZE: usize = 512;

/// Read buffer size for streaming digests and content comparison.
pub(crate) const READ_BUFFER_SIZE: usize = 8192;

/// Lifecycle state of a record.
///
/// Transitions move forward only (`Untouched` to `Sampled` to `Hashed`),
/// except that an I/O failure forces the terminal `Invalid` state from
/// anywhere, and the cluster builder marks matched records `Duplicate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Metadata captured, no file data touched yet.
    Untouched,
    /// Sample buffer populated; digest not yet computed.
    Sampled,
    /// Digest populated (a sample may or may not also be cached).
    Hashed,
    /// Unrecoverable read error; excluded from all further work.
    Invalid,
    /// Absorbed into a cluster; never reconsidered as a fresh head.
    Duplicate,
}

/// Filesystem identity of a file: the (device, inode) pair.
///
/// Two paths with the same identity are the same physical file (hard link
/// or repeated argument), which proves equality without any I/O. On
/// platforms without stable inode semantics no identity is recorded and
/// the identity checks simply never fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId {
    /// Device number
    pub device: u64,
    /// Inode number
    pub inode: u64,
}

/// Extract the filesystem identity from file metadata.
#[cfg(unix)]
#[must_use]
pub fn file_identity(meta: &Metadata) -> Option<FileId> {
    use std::os::unix::fs::MetadataExt;

    Some(FileId {
        device: meta.dev(),
        inode: meta.ino(),
    })
}

/// Extract the filesystem identity from file metadata.
#[cfg(not(unix))]
#[must_use]
pub fn file_identity(_meta: &Metadata) -> Option<FileId> {
    None
}

/// Error raised when reading a record's data fails.
///
/// By the time this error is returned the record has already been marked
/// [`Status::Invalid`] and a warning has been logged; callers treat the
/// comparison as not-equal and move on.
#[derive(thiserror::Error, Debug)]
#[error("{path}: {source}")]
pub struct ReadError {
    /// Path of the file that failed.
    pub path: PathBuf,
    /// The underlying I/O error.
    #[source]
    pub source: io::Error,
}

/// A collected file and potential duplicate.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Path as supplied by traversal (absolute or relative).
    pub path: PathBuf,
    /// File size in bytes at discovery time.
    pub size: u64,
    /// Filesystem identity, when the platform provides one.
    pub id: Option<FileId>,
    status: Status,
    sample: Option<Vec<u8>>,
    digest: Option<Vec<u8>>,
}

impl FileRecord {
    /// Create a record from explicit metadata.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, size: u64, id: Option<FileId>) -> Self {
        Self {
            path: path.into(),
            size,
            id,
            status: Status::Untouched,
            sample: None,
            digest: None,
        }
    }

    /// Create a record from a path and its stat result.
    #[must_use]
    pub fn from_metadata(path: &Path, meta: &Metadata) -> Self {
        Self::new(path, meta.len(), file_identity(meta))
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    /// Whether the record may still participate in comparisons.
    #[must_use]
    pub fn is_candidate(&self) -> bool {
        !matches!(self.status, Status::Invalid | Status::Duplicate)
    }

    /// Mark the record as a cluster member.
    pub fn set_duplicate(&mut self) {
        self.status = Status::Duplicate;
    }

    /// The cached digest, if one has been computed.
    #[must_use]
    pub fn digest(&self) -> Option<&[u8]> {
        self.digest.as_deref()
    }

    /// The cached sample, if one has been read.
    #[must_use]
    pub fn sample(&self) -> Option<&[u8]> {
        self.sample.as_deref()
    }

    /// Length of this record's sample: `min(size, SAMPLE_SIZE)`.
    #[must_use]
    pub fn sample_len(&self) -> usize {
        self.size.min(SAMPLE_SIZE as u64) as usize
    }

    /// Error for any read attempted after the record turned `Invalid`.
    ///
    /// The original failure was already logged; this one is not.
    fn refuse_read(&self) -> ReadError {
        ReadError {
            path: self.path.clone(),
            source: io::Error::other("previously failed to read"),
        }
    }

    /// Placeholder left behind when a record moves into a cluster.
    ///
    /// Carries the `Duplicate` status so the vacated slot is skipped by
    /// every remaining scan over its bucket.
    pub(crate) fn taken() -> Self {
        let mut record = Self::new(PathBuf::new(), 0, None);
        record.status = Status::Duplicate;
        record
    }

    /// Log a read failure and force the terminal `Invalid` state.
    pub(crate) fn mark_invalid(&mut self, source: io::Error) -> ReadError {
        log::warn!("{}: {}", self.path.display(), source);
        self.status = Status::Invalid;
        ReadError {
            path: self.path.clone(),
            source,
        }
    }

    /// Return the sample bytes, reading them from disk on first use.
    ///
    /// The sample holds the first [`SAMPLE_SIZE`] bytes of the file (or the
    /// whole file when smaller) and is never re-read. A record whose file
    /// shrank since discovery fails the read and turns `Invalid`.
    pub fn ensure_sample(&mut self) -> Result<&[u8], ReadError> {
        if self.status == Status::Invalid {
            return Err(self.refuse_read());
        }
        if self.sample.is_none() {
            let mut buf = vec![0u8; self.sample_len()];
            match File::open(&self.path).and_then(|mut f| f.read_exact(&mut buf)) {
                Ok(()) => {}
                Err(e) => return Err(self.mark_invalid(e)),
            }
            self.sample = Some(buf);
            if self.status == Status::Untouched {
                self.status = Status::Sampled;
            }
        }
        Ok(self.sample.as_deref().unwrap_or_default())
    }

    /// Return the digest bytes, computing them on first use.
    ///
    /// When the whole file fits in the cached sample the digest is computed
    /// from the sample, avoiding a second read pass. Otherwise the file is
    /// streamed through the digest in [`READ_BUFFER_SIZE`] chunks.
    pub fn ensure_digest(&mut self, kind: DigestKind) -> Result<&[u8], ReadError> {
        if self.status == Status::Invalid {
            return Err(self.refuse_read());
        }
        if self.digest.is_none() {
            let mut ctx = kind.context();

            let whole_file_sampled =
                self.size <= SAMPLE_SIZE as u64 && self.sample.is_some();
            if whole_file_sampled {
                ctx.update(self.sample.as_deref().unwrap_or_default());
            } else if self.size > 0 {
                let mut stream = match File::open(&self.path) {
                    Ok(f) => f,
                    Err(e) => return Err(self.mark_invalid(e)),
                };
                let mut buf = [0u8; READ_BUFFER_SIZE];
                loop {
                    let n = match stream.read(&mut buf) {
                        Ok(n) => n,
                        Err(e) => return Err(self.mark_invalid(e)),
                    };
                    if n == 0 {
                        break;
                    }
                    ctx.update(&buf[..n]);
                }
            }

            self.digest = Some(ctx.finish());
            if matches!(self.status, Status::Untouched | Status::Sampled) {
                self.status = Status::Hashed;
            }
        }
        Ok(self.digest.as_deref().unwrap_or_default())
    }
}
