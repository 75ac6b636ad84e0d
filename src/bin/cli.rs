//! orbweb CLI entry point.
//!
//! Usage:
//!   orbweb scan ./mypkg              # scan, print summary counts
//!   orbweb scan ./mypkg -o graph.json
//!   orbweb scan ./mypkg -x '^_' -x 'tests?$'
//!   orbweb dump ./mypkg              # JSON graph dump on stdout

use clap::Parser;
use orbweb::cli::{run, Cli};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so the JSON dump on stdout stays clean. `RUST_LOG`
/// overrides the verbosity flags.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "orbweb=info",
        1 => "orbweb=debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
