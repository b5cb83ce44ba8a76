//! Command-line interface definitions.
//!
//! All arguments are defined with the clap derive API. The flag set
//! mirrors classic Unix duplicate finders: short flags for the common
//! knobs, paths as trailing positionals, and stdin as the path source
//! when no positionals are given.
//!
//! # Example
//!
//! ```bash
//! # Report duplicate files under a directory tree
//! dupfind -r ~/Downloads
//!
//! # Byte-by-byte comparison, reading paths from find(1)
//! find /data -name '*.iso' | dupfind -t
//!
//! # Emit a deletion list of everything but one copy per cluster
//! dupfind -re ~/Downloads | xargs rm
//! ```

use clap::Parser;
use std::path::PathBuf;

use crate::scanner::SymlinkMode;

/// Find duplicate files.
///
/// Files are grouped into clusters of identical content. Candidates are
/// narrowed by size, then by a small content sample, and confirmed by
/// digest or by full byte-by-byte comparison.
#[derive(Debug, Parser)]
#[command(name = "dupfind")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Files and directories to examine (reads paths from stdin if omitted)
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Recurse into directories
    #[arg(short, long)]
    pub recursive: bool,

    /// Include hidden files and directories
    #[arg(short, long)]
    pub all: bool,

    /// Compare files byte by byte instead of by digest
    #[arg(short, long)]
    pub thorough: bool,

    /// Sample files of at least SIZE bytes before digesting (0 disables sampling)
    #[arg(short = 'l', long = "limit", value_name = "SIZE", default_value_t = 0)]
    pub limit: u64,

    /// Digest function (sha1, sha256, sha384 or sha512)
    #[arg(short, long, value_name = "FUNCTION", default_value = "sha1")]
    pub digest: String,

    /// List unique files instead of duplicate clusters
    #[arg(short, long, conflicts_with = "excess")]
    pub unique: bool,

    /// List all but one member of each cluster, with no headers
    #[arg(short, long)]
    pub excess: bool,

    /// Cluster header format (%n count, %i index, %s size, %d digest, %% percent;
    /// empty suppresses headers)
    #[arg(short = 'f', long = "format", value_name = "FORMAT")]
    pub header_format: Option<String>,

    /// Ignore empty files
    #[arg(short = 'z', long = "zero")]
    pub ignore_empty: bool,

    /// Count each physical file only once (skip extra hard links)
    #[arg(short, long)]
    pub physical: bool,

    /// Suppress clusters whose members are all hard links to one file
    #[arg(long, conflicts_with = "physical")]
    pub physical_clusters: bool,

    /// Only compare files on the same device
    #[arg(long)]
    pub same_device: bool,

    /// Dereference symlinks given on the command line
    #[arg(short = 'H', conflicts_with_all = ["follow_all", "follow_none"])]
    pub follow_args: bool,

    /// Dereference every symlink encountered
    #[arg(short = 'L', conflicts_with = "follow_none")]
    pub follow_all: bool,

    /// Never dereference symlinks (default)
    #[arg(short = 'P')]
    pub follow_none: bool,

    /// Terminate output fields with NUL instead of newline
    #[arg(short = '0', long = "null")]
    pub null: bool,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Increase verbosity level (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// The symlink policy selected by `-H`/`-L`/`-P`.
    #[must_use]
    pub fn symlink_mode(&self) -> SymlinkMode {
        if self.follow_all {
            SymlinkMode::Always
        } else if self.follow_args {
            SymlinkMode::CommandLine
        } else {
            SymlinkMode::Never
        }
    }

    /// The output field terminator (`\0` with `-0`, newline otherwise).
    #[must_use]
    pub fn terminator(&self) -> u8 {
        if self.null {
            b'\0'
        } else {
            b'\n'
        }
    }
}
