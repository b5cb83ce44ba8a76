//! dupfind - duplicate file finder.
//!
//! Groups files with identical content into clusters and reports them.
//! Equality is decided by a staged comparison: size first, then physical
//! identity, then a small leading sample, and finally either a digest
//! (SHA-1 by default) or a full byte-by-byte comparison.
//!
//! # Architecture
//!
//! - [`cli`]: command-line definitions (clap derive)
//! - [`config`]: the immutable comparison configuration
//! - [`digest`]: digest function selection and streaming contexts
//! - [`scanner`]: path traversal feeding the candidate pool
//! - [`engine`]: the pool, comparator and cluster builder
//! - [`report`]: cluster and unique-file output
//! - [`logging`]: `log`/`env_logger` setup
//!
//! # Example
//!
//! ```rust,no_run
//! use dupfind::config::CompareConfig;
//! use dupfind::engine::{CandidatePool, ClusterBuilder, Comparator, FileRecord};
//! use dupfind::report::StandardReporter;
//! use dupfind::digest::DigestKind;
//!
//! let mut pool = CandidatePool::new();
//! pool.insert(FileRecord::new("a.txt", 12, None));
//! pool.insert(FileRecord::new("b.txt", 12, None));
//!
//! let mut reporter = StandardReporter::new(
//!     std::io::stdout().lock(),
//!     "%n files in cluster %i (%s bytes)".to_string(),
//!     DigestKind::Sha1,
//!     b'\n',
//! );
//! let builder = ClusterBuilder::new(Comparator::new(CompareConfig::default()), &mut reporter);
//! let stats = builder.find_clusters(&mut pool)?;
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod cli;
pub mod config;
pub mod digest;
pub mod engine;
pub mod logging;
pub mod report;
pub mod scanner;

use std::io::{self, BufWriter, Write};

use anyhow::Context;

use cli::Cli;
use config::{CompareConfig, ConfigError};
use digest::DigestKind;
use engine::{CandidatePool, ClusterBuilder, Comparator, ScanStats};
use report::{
    default_header_format, header_uses_digest, ExcessReporter, Reporter, StandardReporter,
};
use scanner::{read_paths, Walker, WalkerConfig};

/// Run the application with parsed arguments.
///
/// Returns an error for configuration problems and for output failures;
/// per-file read errors are logged and absorbed.
pub fn run_app(cli: Cli) -> anyhow::Result<()> {
    logging::init_logging(cli.verbose, cli.quiet);

    let digest = DigestKind::from_name(&cli.digest)
        .ok_or_else(|| ConfigError::UnknownDigest(cli.digest.clone()))?;

    let header_format = match &cli.header_format {
        Some(format) => format.clone(),
        None => default_header_format(cli.thorough).to_string(),
    };
    if cli.thorough && header_uses_digest(&header_format) {
        return Err(ConfigError::DigestHeaderInThoroughMode.into());
    }

    let config = CompareConfig::default()
        .with_thorough(cli.thorough)
        .with_sample_threshold(cli.limit)
        .with_cross_device(!cli.same_device)
        .with_digest(digest);

    let mut pool = collect_candidates(&cli).context("failed to collect files")?;
    log::info!("collected {} candidate files", pool.len());

    let terminator = cli.terminator();
    let stdout = io::stdout().lock();
    let mut out = BufWriter::new(stdout);

    let stats = if cli.unique {
        // Unique mode never prints headers.
        let mut reporter = StandardReporter::new(&mut out, String::new(), digest, terminator);
        run_scan(&cli, config, &mut reporter, &mut pool, true)?
    } else if cli.excess {
        let mut reporter = ExcessReporter::new(&mut out, terminator);
        run_scan(&cli, config, &mut reporter, &mut pool, false)?
    } else {
        let mut reporter = StandardReporter::new(&mut out, header_format, digest, terminator);
        run_scan(&cli, config, &mut reporter, &mut pool, false)?
    };

    out.flush().context("failed to flush output")?;

    if stats.invalid_files > 0 {
        log::warn!("{} files could not be read", stats.invalid_files);
    }
    Ok(())
}

fn collect_candidates(cli: &Cli) -> anyhow::Result<CandidatePool> {
    let mut pool = CandidatePool::new();
    let config = WalkerConfig {
        recursive: cli.recursive,
        all_files: cli.all,
        symlinks: cli.symlink_mode(),
        ignore_empty: cli.ignore_empty,
        physical: cli.physical,
    };
    let mut walker = Walker::new(&mut pool, config);

    if cli.paths.is_empty() {
        let stdin = io::stdin().lock();
        let paths = read_paths(stdin, cli.terminator())
            .context("failed to read paths from stdin")?;
        for path in &paths {
            walker.process_path(path);
        }
    } else {
        for path in &cli.paths {
            walker.process_path(path);
        }
    }

    let stats = walker.into_stats();
    log::debug!(
        "traversal finished: {} files, {} bytes, {} hard links skipped",
        stats.files,
        stats.total_bytes,
        stats.skipped_physical
    );
    Ok(pool)
}

fn run_scan<R: Reporter>(
    cli: &Cli,
    config: CompareConfig,
    reporter: &mut R,
    pool: &mut CandidatePool,
    unique: bool,
) -> io::Result<ScanStats> {
    let builder = ClusterBuilder::new(Comparator::new(config), reporter)
        .with_suppress_hardlink_clusters(cli.physical_clusters);
    if unique {
        builder.find_uniques(pool)
    } else {
        builder.find_clusters(pool)
    }
}
