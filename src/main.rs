//! dupfind - duplicate file finder.
//!
//! Entry point for the dupfind CLI.

use clap::Parser;
use dupfind::cli::Cli;

fn main() {
    let cli = Cli::parse();

    if let Err(err) = dupfind::run_app(cli) {
        eprintln!("dupfind: {err:#}");
        std::process::exit(1);
    }
}
