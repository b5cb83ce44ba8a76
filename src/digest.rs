//! Message digest primitive for full-content fingerprints.
//!
//! # Overview
//!
//! The comparator trusts a cryptographic digest of a file's full contents
//! as proof of equality (unless thorough mode is enabled). The digest
//! function is selected by name at startup and exposed through a small
//! init/update/finish surface with a fixed output size per variant, so the
//! rest of the engine never cares which SHA family member is active.
//!
//! # Example
//!
//! ```
//! use dupfind::digest::DigestKind;
//!
//! let kind = DigestKind::from_name("sha-256").unwrap();
//! let mut ctx = kind.context();
//! ctx.update(b"hello");
//! let digest = ctx.finish();
//! assert_eq!(digest.len(), kind.output_size());
//! ```

use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

/// Supported digest functions.
///
/// All four are members of the SHA family; the default is SHA-1, which is
/// plenty for content fingerprinting (collision resistance against an
/// adversary is not a goal of duplicate detection).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestKind {
    /// SHA-1 (20-byte output, default)
    Sha1,
    /// SHA-256 (32-byte output)
    Sha256,
    /// SHA-384 (48-byte output)
    Sha384,
    /// SHA-512 (64-byte output)
    Sha512,
}

impl Default for DigestKind {
    fn default() -> Self {
        Self::Sha1
    }
}

impl DigestKind {
    /// Look up a digest function by name.
    ///
    /// Both the plain (`sha256`) and dashed (`sha-256`) spellings are
    /// accepted, case-insensitively. Returns `None` for unknown names;
    /// the caller turns that into a configuration error.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sha1" | "sha-1" => Some(Self::Sha1),
            "sha256" | "sha-256" => Some(Self::Sha256),
            "sha384" | "sha-384" => Some(Self::Sha384),
            "sha512" | "sha-512" => Some(Self::Sha512),
            _ => None,
        }
    }

    /// Canonical name of this digest function.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    /// Size of the produced digest, in bytes.
    #[must_use]
    pub fn output_size(self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Start a fresh digest computation.
    #[must_use]
    pub fn context(self) -> DigestContext {
        match self {
            Self::Sha1 => DigestContext::Sha1(Sha1::new()),
            Self::Sha256 => DigestContext::Sha256(Sha256::new()),
            Self::Sha384 => DigestContext::Sha384(Sha384::new()),
            Self::Sha512 => DigestContext::Sha512(Sha512::new()),
        }
    }
}

/// An in-progress digest computation.
///
/// One variant per supported algorithm; created by [`DigestKind::context`].
pub enum DigestContext {
    /// SHA-1 state
    Sha1(Sha1),
    /// SHA-256 state
    Sha256(Sha256),
    /// SHA-384 state
    Sha384(Sha384),
    /// SHA-512 state
    Sha512(Sha512),
}

impl DigestContext {
    /// Feed more data into the digest.
    pub fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha1(ctx) => ctx.update(data),
            Self::Sha256(ctx) => ctx.update(data),
            Self::Sha384(ctx) => ctx.update(data),
            Self::Sha512(ctx) => ctx.update(data),
        }
    }

    /// Finish the computation and return the digest bytes.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        match self {
            Self::Sha1(ctx) => ctx.finalize().to_vec(),
            Self::Sha256(ctx) => ctx.finalize().to_vec(),
            Self::Sha384(ctx) => ctx.finalize().to_vec(),
            Self::Sha512(ctx) => ctx.finalize().to_vec(),
        }
    }
}

/// Render a digest as a lowercase hexadecimal string.
#[must_use]
pub fn digest_to_hex(digest: &[u8]) -> String {
    use std::fmt::Write;

    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_accepts_both_spellings() {
        assert_eq!(DigestKind::from_name("sha1"), Some(DigestKind::Sha1));
        assert_eq!(DigestKind::from_name("sha-1"), Some(DigestKind::Sha1));
        assert_eq!(DigestKind::from_name("SHA256"), Some(DigestKind::Sha256));
        assert_eq!(DigestKind::from_name("sha-384"), Some(DigestKind::Sha384));
        assert_eq!(DigestKind::from_name("sha-512"), Some(DigestKind::Sha512));
        assert_eq!(DigestKind::from_name("md5"), None);
        assert_eq!(DigestKind::from_name(""), None);
    }

    #[test]
    fn test_output_sizes() {
        assert_eq!(DigestKind::Sha1.output_size(), 20);
        assert_eq!(DigestKind::Sha256.output_size(), 32);
        assert_eq!(DigestKind::Sha384.output_size(), 48);
        assert_eq!(DigestKind::Sha512.output_size(), 64);
    }

    #[test]
    fn test_digest_length_matches_output_size() {
        for kind in [
            DigestKind::Sha1,
            DigestKind::Sha256,
            DigestKind::Sha384,
            DigestKind::Sha512,
        ] {
            let mut ctx = kind.context();
            ctx.update(b"abc");
            assert_eq!(ctx.finish().len(), kind.output_size());
        }
    }

    #[test]
    fn test_known_sha1_vector() {
        let mut ctx = DigestKind::Sha1.context();
        ctx.update(b"abc");
        assert_eq!(
            digest_to_hex(&ctx.finish()),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_known_sha256_vector() {
        let mut ctx = DigestKind::Sha256.context();
        ctx.update(b"abc");
        assert_eq!(
            digest_to_hex(&ctx.finish()),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_incremental_update_matches_one_shot() {
        let mut a = DigestKind::Sha256.context();
        a.update(b"hello ");
        a.update(b"world");

        let mut b = DigestKind::Sha256.context();
        b.update(b"hello world");

        assert_eq!(a.finish(), b.finish());
    }

    #[test]
    fn test_empty_input_digest() {
        let ctx = DigestKind::Sha1.context();
        assert_eq!(
            digest_to_hex(&ctx.finish()),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }
}
