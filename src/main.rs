mod config;
mod gitea;
mod http;
mod logger;
mod resource;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use resource::{CheckRequest, InRequest, OutRequest};
use std::{
    io::{stdin, stdout},
    path::PathBuf,
};

/// Concourse resource for Gitea releases
#[derive(Parser, Debug)]
#[command(name = "gitea-release-resource", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List release versions newer than the one given on stdin
    Check,

    /// Fetch a release's metadata and assets into a directory
    #[command(name = "in")]
    In {
        /// Directory the release is written to
        destination: PathBuf,
    },

    /// Create or update a release from the files of a directory
    Out {
        /// Directory holding the release inputs and assets
        source: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    logger::init()?;
    let cli = Cli::parse();

    match cli.command {
        Command::Check => {
            let request: CheckRequest = resource::read_request(stdin().lock())?;
            let versions = resource::check::check(&request)
                .await
                .context("Cannot check for new releases")?;
            resource::write_response(stdout().lock(), &versions)?;
        }
        Command::In { destination } => {
            let request: InRequest = resource::read_request(stdin().lock())?;
            let response = resource::get::get(&destination, &request)
                .await
                .context("Cannot fetch the release")?;
            resource::write_response(stdout().lock(), &response)?;
        }
        Command::Out { source } => {
            let request: OutRequest = resource::read_request(stdin().lock())?;
            let response = resource::put::put(&source, &request)
                .await
                .context("Cannot publish the release")?;
            resource::write_response(stdout().lock(), &response)?;
        }
    }

    Ok(())
}
