#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Binary entrypoint: parses arguments and hands off to
//! [`fleetkeeper_app::bootstrap::run`].

use std::process::ExitCode;

use clap::Parser;
use fleetkeeper_app::bootstrap;
use fleetkeeper_app::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match bootstrap::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("fleetkeeper: {error:#}");
            ExitCode::FAILURE
        }
    }
}
