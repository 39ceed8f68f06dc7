//! Command-line surface.

use std::path::PathBuf;

use clap::Parser;

/// A BitTorrent fleet reconciliation daemon.
#[derive(Debug, Parser)]
#[command(name = "fleetkeeper", version, about)]
pub struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, env = "FLEETKEEPER_CONFIG", default_value = "config/config.yml")]
    pub config: PathBuf,

    /// Run one tag task and one disk task per worker, then exit, bypassing
    /// the process lock.
    #[arg(short, long)]
    pub singlerun: bool,
}
