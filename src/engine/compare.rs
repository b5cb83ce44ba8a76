//! Staged equality test between two file records.
//!
//! # Overview
//!
//! The comparator looks for proof of equality or inequality as early and
//! as cheaply as possible, escalating only when a stage is inconclusive:
//!
//! 1. Unequal sizes: distinct, immediately.
//! 2. Both zero bytes: equal, no I/O.
//! 3. Same (device, inode): equal, no I/O; this is one physical file.
//! 4. Cross-device comparison disabled and devices differ: distinct.
//! 5. Sampling (when enabled for this size): compare cached 512-byte
//!    prefixes; a mismatch is conclusive, and so is a match when the
//!    sample covers the whole file.
//! 6. Thorough mode: full lockstep content comparison.
//! 7. Otherwise: compare cached full-content digests.
//!
//! A read failure during any stage marks the failing record invalid and
//! the pair is deemed distinct; the invalid record never comes back.

use std::fs::File;
use std::io::Read;

use crate::config::CompareConfig;

use super::record::{FileRecord, ReadError, Status, SAMPLE_SIZE, READ_BUFFER_SIZE};

/// Decides whether two file records denote byte-identical content.
#[derive(Debug)]
pub struct Comparator {
    config: CompareConfig,
}

impl Comparator {
    /// Create a comparator with the given configuration.
    #[must_use]
    pub fn new(config: CompareConfig) -> Self {
        Self { config }
    }

    /// The configuration this comparator was built with.
    #[must_use]
    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Compare two records, returning `true` when they are byte-identical.
    ///
    /// May populate either record's sample or digest cache, and may mark
    /// either record invalid on a read failure (in which case the result
    /// is `false` and the record is excluded from all further work).
    pub fn compare(&self, first: &mut FileRecord, second: &mut FileRecord) -> bool {
        // Invalid is terminal: the file is never reopened, even if the
        // path has become readable again since the failure.
        if first.status() == Status::Invalid || second.status() == Status::Invalid {
            return false;
        }

        if first.size != second.size {
            return false;
        }

        if first.size == 0 {
            return true;
        }

        if let (Some(a), Some(b)) = (first.id, second.id) {
            if a == b {
                return true;
            }
            if !self.config.cross_device && a.device != b.device {
                return false;
            }
        }

        if self.config.sample_threshold > 0 && first.size >= self.config.sample_threshold {
            match compare_samples(first, second) {
                Ok(false) | Err(_) => return false,
                Ok(true) => {
                    // The sample was the whole file, so the match is
                    // conclusive and the expensive stages can be skipped.
                    if first.size <= SAMPLE_SIZE as u64 {
                        return true;
                    }
                }
            }
        }

        if self.config.thorough {
            compare_contents(first, second).unwrap_or(false)
        } else {
            compare_digests(first, second, &self.config).unwrap_or(false)
        }
    }
}

/// Compare the cached samples of two records, reading them if needed.
fn compare_samples(first: &mut FileRecord, second: &mut FileRecord) -> Result<bool, ReadError> {
    let a = first.ensure_sample()?;
    let b = second.ensure_sample()?;
    Ok(a == b)
}

/// Compare the cached digests of two records, computing them if needed.
fn compare_digests(
    first: &mut FileRecord,
    second: &mut FileRecord,
    config: &CompareConfig,
) -> Result<bool, ReadError> {
    let a = first.ensure_digest(config.digest)?;
    let b = second.ensure_digest(config.digest)?;
    Ok(a == b)
}

/// Full byte-by-byte comparison of two files of equal size.
///
/// Reads both files in lockstep and stops at the first mismatch or at EOF.
/// Equal only when every byte matched and both files delivered exactly the
/// recorded size (a file that changed length since discovery cannot match).
fn compare_contents(first: &mut FileRecord, second: &mut FileRecord) -> Result<bool, ReadError> {
    let mut first_stream = match File::open(&first.path) {
        Ok(f) => f,
        Err(e) => return Err(first.mark_invalid(e)),
    };
    let mut second_stream = match File::open(&second.path) {
        Ok(f) => f,
        Err(e) => return Err(second.mark_invalid(e)),
    };

    let mut first_buf = [0u8; READ_BUFFER_SIZE];
    let mut second_buf = [0u8; READ_BUFFER_SIZE];
    let mut matched: u64 = 0;

    loop {
        let n = match fill_buffer(&mut first_stream, &mut first_buf) {
            Ok(n) => n,
            Err(e) => return Err(first.mark_invalid(e)),
        };
        let m = match fill_buffer(&mut second_stream, &mut second_buf) {
            Ok(m) => m,
            Err(e) => return Err(second.mark_invalid(e)),
        };

        if n != m || first_buf[..n] != second_buf[..m] {
            return Ok(false);
        }
        if n == 0 {
            break;
        }
        matched += n as u64;
    }

    Ok(matched == first.size)
}

/// Read until the buffer is full or EOF, returning the number of bytes.
fn fill_buffer(stream: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = stream.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::DigestKind;
    use crate::engine::record::{FileId, Status};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn record_for(path: &PathBuf) -> FileRecord {
        let meta = fs::metadata(path).unwrap();
        FileRecord::from_metadata(path, &meta)
    }

    #[test]
    fn test_size_mismatch_is_conclusive_without_io() {
        // Nonexistent paths prove no I/O happens for this stage.
        let mut a = FileRecord::new("/nope/a", 10, None);
        let mut b = FileRecord::new("/nope/b", 20, None);
        let comparator = Comparator::new(CompareConfig::default());

        assert!(!comparator.compare(&mut a, &mut b));
        assert_eq!(a.status(), Status::Untouched);
        assert_eq!(b.status(), Status::Untouched);
    }

    #[test]
    fn test_zero_size_records_are_equal_without_io() {
        let mut a = FileRecord::new("/nope/a", 0, None);
        let mut b = FileRecord::new("/nope/b", 0, None);
        let comparator = Comparator::new(CompareConfig::default());

        assert!(comparator.compare(&mut a, &mut b));
    }

    #[test]
    fn test_same_identity_is_equal_without_io() {
        let id = FileId {
            device: 3,
            inode: 1234,
        };
        let mut a = FileRecord::new("/nope/link1", 100, Some(id));
        let mut b = FileRecord::new("/nope/link2", 100, Some(id));
        let comparator = Comparator::new(CompareConfig::default());

        assert!(comparator.compare(&mut a, &mut b));
        assert_eq!(a.status(), Status::Untouched);
    }

    #[test]
    fn test_cross_device_filter() {
        let mut a = FileRecord::new(
            "/nope/a",
            100,
            Some(FileId {
                device: 1,
                inode: 10,
            }),
        );
        let mut b = FileRecord::new(
            "/nope/b",
            100,
            Some(FileId {
                device: 2,
                inode: 10,
            }),
        );
        let comparator =
            Comparator::new(CompareConfig::default().with_cross_device(false));

        assert!(!comparator.compare(&mut a, &mut b));
        assert_eq!(a.status(), Status::Untouched);
    }

    #[test]
    fn test_digest_mode_detects_duplicates() {
        let dir = TempDir::new().unwrap();
        let p1 = write_file(&dir, "one.txt", b"identical contents here");
        let p2 = write_file(&dir, "two.txt", b"identical contents here");
        let p3 = write_file(&dir, "odd.txt", b"identical contents herE");

        let comparator = Comparator::new(CompareConfig::default());
        assert!(comparator.compare(&mut record_for(&p1), &mut record_for(&p2)));
        assert!(!comparator.compare(&mut record_for(&p1), &mut record_for(&p3)));
    }

    #[test]
    fn test_thorough_mode_detects_duplicates() {
        let dir = TempDir::new().unwrap();
        let big = vec![0xabu8; READ_BUFFER_SIZE * 2 + 17];
        let mut other = big.clone();
        *other.last_mut().unwrap() = 0xac; // differs in exactly one byte

        let p1 = write_file(&dir, "one.bin", &big);
        let p2 = write_file(&dir, "two.bin", &big);
        let p3 = write_file(&dir, "odd.bin", &other);

        let comparator = Comparator::new(CompareConfig::default().with_thorough(true));
        assert!(comparator.compare(&mut record_for(&p1), &mut record_for(&p2)));
        assert!(!comparator.compare(&mut record_for(&p1), &mut record_for(&p3)));
    }

    #[test]
    fn test_thorough_mode_computes_no_digest() {
        let dir = TempDir::new().unwrap();
        let p1 = write_file(&dir, "one.txt", b"same");
        let p2 = write_file(&dir, "two.txt", b"same");
        let mut a = record_for(&p1);
        let mut b = record_for(&p2);

        let comparator = Comparator::new(CompareConfig::default().with_thorough(true));
        assert!(comparator.compare(&mut a, &mut b));
        assert!(a.digest().is_none());
        assert!(b.digest().is_none());
    }

    #[test]
    fn test_sample_mismatch_short_circuits() {
        let dir = TempDir::new().unwrap();
        let p1 = write_file(&dir, "one.txt", b"aaaa data");
        let p2 = write_file(&dir, "two.txt", b"bbbb data");
        let mut a = record_for(&p1);
        let mut b = record_for(&p2);

        let comparator =
            Comparator::new(CompareConfig::default().with_sample_threshold(1));
        assert!(!comparator.compare(&mut a, &mut b));
        // The mismatch was proven from samples alone.
        assert!(a.digest().is_none());
        assert!(b.digest().is_none());
        assert_eq!(a.status(), Status::Sampled);
    }

    #[test]
    fn test_whole_file_sample_match_skips_digest() {
        let dir = TempDir::new().unwrap();
        let p1 = write_file(&dir, "one.txt", b"short and equal");
        let p2 = write_file(&dir, "two.txt", b"short and equal");
        let mut a = record_for(&p1);
        let mut b = record_for(&p2);

        let comparator =
            Comparator::new(CompareConfig::default().with_sample_threshold(1));
        assert!(comparator.compare(&mut a, &mut b));
        assert!(a.digest().is_none());
        assert!(b.digest().is_none());
    }

    #[test]
    fn test_sampling_inactive_below_threshold() {
        let dir = TempDir::new().unwrap();
        let p1 = write_file(&dir, "one.txt", b"equal");
        let p2 = write_file(&dir, "two.txt", b"equal");
        let mut a = record_for(&p1);
        let mut b = record_for(&p2);

        let comparator =
            Comparator::new(CompareConfig::default().with_sample_threshold(1_000_000));
        assert!(comparator.compare(&mut a, &mut b));
        // Sampling never ran; equality came from digests.
        assert!(a.sample().is_none());
        assert!(a.digest().is_some());
    }

    #[test]
    fn test_unreadable_file_is_distinct_and_invalid() {
        let dir = TempDir::new().unwrap();
        let p1 = write_file(&dir, "one.txt", b"contents");
        let mut a = record_for(&p1);
        let mut b = FileRecord::new(dir.path().join("gone.txt"), 8, None);

        let comparator = Comparator::new(CompareConfig::default());
        assert!(!comparator.compare(&mut a, &mut b));
        assert_eq!(b.status(), Status::Invalid);
        assert!(a.is_candidate());
    }

    #[test]
    fn test_invalid_record_is_never_reread() {
        let dir = TempDir::new().unwrap();
        let good = write_file(&dir, "good.txt", b"twelve bytes");
        let flaky_path = dir.path().join("flaky.txt");
        let mut flaky = FileRecord::new(&flaky_path, 12, None);
        let mut good_rec = record_for(&good);

        let comparator = Comparator::new(CompareConfig::default());
        assert!(!comparator.compare(&mut flaky, &mut good_rec));
        assert_eq!(flaky.status(), Status::Invalid);

        // The path turning up later with matching contents must not
        // resurrect the record.
        fs::write(&flaky_path, b"twelve bytes").unwrap();
        assert!(!comparator.compare(&mut flaky, &mut good_rec));
        assert_eq!(flaky.status(), Status::Invalid);
        assert!(flaky.sample().is_none());
        assert!(flaky.digest().is_none());
    }

    #[test]
    fn test_compare_is_symmetric() {
        let dir = TempDir::new().unwrap();
        let p1 = write_file(&dir, "one.txt", b"payload");
        let p2 = write_file(&dir, "two.txt", b"payload");
        let p3 = write_file(&dir, "thr.txt", b"PAYLOAD");

        let comparator = Comparator::new(CompareConfig::default());
        for (x, y) in [(&p1, &p2), (&p1, &p3)] {
            let forward = comparator.compare(&mut record_for(x), &mut record_for(y));
            let backward = comparator.compare(&mut record_for(y), &mut record_for(x));
            assert_eq!(forward, backward);
        }
    }
}
