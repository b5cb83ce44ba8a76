//! Cluster and unique-file reporting.
//!
//! # Overview
//!
//! The engine hands completed clusters (or, in the alternate mode, unique
//! records) to a [`Reporter`]. Two writers are provided:
//!
//! - [`StandardReporter`]: prints a templated header per cluster followed
//!   by every member path.
//! - [`ExcessReporter`]: prints all members but the head, with no headers;
//!   the output is a ready-made deletion list.
//!
//! # Header templates
//!
//! The header format understands the escapes `%n` (member count), `%i`
//! (1-based cluster index), `%s` (file size in bytes), `%d` (hex digest of
//! the head) and `%%` (a literal percent sign). The default format is
//!
//! ```text
//! %n files in cluster %i (%s bytes, digest %d)
//! ```
//!
//! or the same without the digest in thorough mode, where no digest is
//! ever computed.

use std::io::{self, Write};

use crate::digest::{digest_to_hex, DigestKind};
use crate::engine::{Cluster, FileRecord};

/// Consumes completed clusters and unique records.
pub trait Reporter {
    /// Report one completed cluster.
    ///
    /// The cluster is mutable so the reporter may materialize the head's
    /// digest when its header format calls for one.
    fn report_cluster(&mut self, cluster: &mut Cluster) -> io::Result<()>;

    /// Report one unique record (alternate mode).
    fn report_unique(&mut self, record: &FileRecord) -> io::Result<()>;
}

/// The default cluster header format for the given comparison strategy.
#[must_use]
pub fn default_header_format(thorough: bool) -> &'static str {
    if thorough {
        "%n files in cluster %i (%s bytes)"
    } else {
        "%n files in cluster %i (%s bytes, digest %d)"
    }
}

/// Whether a header format requests the head digest (`%d`).
#[must_use]
pub fn header_uses_digest(format: &str) -> bool {
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c == '%' {
            match chars.next() {
                Some('d') => return true,
                Some(_) | None => {}
            }
        }
    }
    false
}

/// Expand a cluster header format.
///
/// Unknown escapes are passed through verbatim; a missing digest renders
/// as an empty field.
#[must_use]
pub fn format_cluster_header(
    format: &str,
    count: usize,
    index: usize,
    size: u64,
    digest: Option<&[u8]>,
) -> String {
    use std::fmt::Write as _;

    let mut out = String::with_capacity(format.len() + 16);
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => {
                let _ = write!(out, "{count}");
            }
            Some('i') => {
                let _ = write!(out, "{index}");
            }
            Some('s') => {
                let _ = write!(out, "{size}");
            }
            Some('d') => {
                if let Some(digest) = digest {
                    out.push_str(&digest_to_hex(digest));
                }
            }
            Some('%') => out.push('%'),
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }
    out
}

/// Prints cluster headers and member paths.
pub struct StandardReporter<W: Write> {
    out: W,
    header_format: String,
    uses_digest: bool,
    digest: DigestKind,
    terminator: u8,
}

impl<W: Write> StandardReporter<W> {
    /// Create a reporter writing to `out`.
    ///
    /// An empty `header_format` suppresses headers entirely.
    pub fn new(out: W, header_format: String, digest: DigestKind, terminator: u8) -> Self {
        let uses_digest = header_uses_digest(&header_format);
        Self {
            out,
            header_format,
            uses_digest,
            digest,
            terminator,
        }
    }

    fn write_field(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.write_all(&[self.terminator])
    }
}

impl<W: Write> Reporter for StandardReporter<W> {
    fn report_cluster(&mut self, cluster: &mut Cluster) -> io::Result<()> {
        if !self.header_format.is_empty() {
            if self.uses_digest {
                // Usually free: the head's digest was cached during
                // comparison. A failure here only degrades the header.
                if cluster.head().digest().is_none() {
                    let kind = self.digest;
                    let _ = cluster.head_mut().ensure_digest(kind);
                }
            }
            let header = format_cluster_header(
                &self.header_format,
                cluster.len(),
                cluster.index,
                cluster.file_size(),
                cluster.head().digest(),
            );
            self.write_field(&header)?;
        }

        for record in &cluster.records {
            let path = record.path.display().to_string();
            self.write_field(&path)?;
        }
        Ok(())
    }

    fn report_unique(&mut self, record: &FileRecord) -> io::Result<()> {
        let path = record.path.display().to_string();
        self.write_field(&path)
    }
}

/// Prints every cluster member except the head, with no headers.
pub struct ExcessReporter<W: Write> {
    out: W,
    terminator: u8,
}

impl<W: Write> ExcessReporter<W> {
    /// Create an excess reporter writing to `out`.
    pub fn new(out: W, terminator: u8) -> Self {
        Self { out, terminator }
    }
}

impl<W: Write> Reporter for ExcessReporter<W> {
    fn report_cluster(&mut self, cluster: &mut Cluster) -> io::Result<()> {
        for record in cluster.records.iter().skip(1) {
            self.out
                .write_all(record.path.display().to_string().as_bytes())?;
            self.out.write_all(&[self.terminator])?;
        }
        Ok(())
    }

    fn report_unique(&mut self, record: &FileRecord) -> io::Result<()> {
        self.out
            .write_all(record.path.display().to_string().as_bytes())?;
        self.out.write_all(&[self.terminator])
    }
}
