//! Immutable engine configuration.
//!
//! All comparison behavior is captured in a [`CompareConfig`] built once at
//! startup and handed to the comparator by value. Nothing in the engine
//! reads ambient state, which keeps the comparison stages testable in
//! isolation.

use crate::digest::DigestKind;

/// Configuration consumed by the comparator.
#[derive(Debug, Clone)]
pub struct CompareConfig {
    /// Force full byte-by-byte content comparison instead of trusting
    /// digests.
    pub thorough: bool,
    /// Minimum file size, in bytes, before the sampling stage activates.
    /// Zero disables sampling entirely.
    pub sample_threshold: u64,
    /// Whether files on different devices may be compared at all.
    /// When false, records on different devices are immediately distinct.
    pub cross_device: bool,
    /// Digest function used for full-content fingerprints.
    pub digest: DigestKind,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            thorough: false,
            sample_threshold: 0,
            cross_device: true,
            digest: DigestKind::default(),
        }
    }
}

impl CompareConfig {
    /// Enable or disable thorough mode.
    #[must_use]
    pub fn with_thorough(mut self, thorough: bool) -> Self {
        self.thorough = thorough;
        self
    }

    /// Set the sampling threshold (0 disables sampling).
    #[must_use]
    pub fn with_sample_threshold(mut self, threshold: u64) -> Self {
        self.sample_threshold = threshold;
        self
    }

    /// Allow or forbid comparisons across devices.
    #[must_use]
    pub fn with_cross_device(mut self, cross_device: bool) -> Self {
        self.cross_device = cross_device;
        self
    }

    /// Select the digest function.
    #[must_use]
    pub fn with_digest(mut self, digest: DigestKind) -> Self {
        self.digest = digest;
        self
    }
}

/// Errors detected before any file processing begins.
///
/// These are the only fatal error class besides allocation failure; a bad
/// configuration aborts the run immediately.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The requested digest function name is not recognized.
    #[error("unknown digest function: {0}")]
    UnknownDigest(String),

    /// The cluster header format requests a digest (%d), but thorough mode
    /// never computes one.
    #[error("digest (%d) is not calculated in thorough mode")]
    DigestHeaderInThoroughMode,
}
