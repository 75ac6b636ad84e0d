//! CLI for orbweb.
//!
//! Commands:
//! - `scan`: build the structure graph, print summary counts
//! - `dump`: build the structure graph, write the JSON dump to stdout
//!
//! Exclusion patterns come from `-x/--exclude` flags and from an optional
//! `orbweb.toml` (looked up inside a scanned directory, or next to a
//! scanned file, unless `--config` points elsewhere).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};

use crate::config::Config;
use crate::error::Result as OrbwebResult;
use crate::filter::ExclusionFilter;
use crate::graph::{GraphDump, GraphStore};
use crate::scan::{ScanReport, Scanner};

#[derive(Parser)]
#[command(name = "orbweb")]
#[command(version)]
#[command(about = "Map the internal structure of a Python package as a typed graph")]
pub struct Cli {
    /// Verbose output (can be repeated: -v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a package directory or module file and print summary counts
    Scan {
        /// Package directory or .py file to scan
        path: PathBuf,

        /// Exclusion pattern, matched against member and submodule names
        /// (repeatable)
        #[arg(short = 'x', long = "exclude", value_name = "PATTERN")]
        exclude: Vec<String>,

        /// Config file with exclusion patterns
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Also write the JSON graph dump to a file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Scan and write the JSON graph dump to stdout
    Dump {
        /// Package directory or .py file to scan
        path: PathBuf,

        /// Exclusion pattern (repeatable)
        #[arg(short = 'x', long = "exclude", value_name = "PATTERN")]
        exclude: Vec<String>,

        /// Config file with exclusion patterns
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

/// Run a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Scan {
            path,
            exclude,
            config,
            output,
        } => {
            let (report, graph) = run_scan(&path, &exclude, config.as_deref())?;
            println!("Scanned `{}`", report.root);
            println!("{}", report.summary);
            if let Some(output) = output {
                let dump = GraphDump::from_store(&graph);
                let json = serde_json::to_string_pretty(&dump)?;
                fs::write(&output, json)
                    .with_context(|| format!("failed to write {}", output.display()))?;
                println!("Graph written to {}", output.display());
            }
        }
        Commands::Dump {
            path,
            exclude,
            config,
        } => {
            let (_, graph) = run_scan(&path, &exclude, config.as_deref())?;
            let dump = GraphDump::from_store(&graph);
            let json = serde_json::to_string_pretty(&dump)?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Assemble the filter, scan, and hand back the report and finished graph.
fn run_scan(
    path: &Path,
    exclude: &[String],
    config: Option<&Path>,
) -> OrbwebResult<(ScanReport, GraphStore)> {
    let config = match config {
        Some(file) => Some(Config::load(file)?),
        None => Config::discover(config_dir(path))?,
    };

    let mut filter = ExclusionFilter::new();
    if let Some(config) = &config {
        for pattern in &config.exclude {
            filter.add_rule(pattern)?;
        }
    }
    for pattern in exclude {
        filter.add_rule(pattern)?;
    }

    let (mut scanner, root) = Scanner::for_path(path, filter)?;
    let report = scanner.scan(&root)?;
    Ok((report, scanner.into_graph()))
}

/// Where to look for an adjacent `orbweb.toml`.
fn config_dir(path: &Path) -> &Path {
    if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or(path)
    }
}
