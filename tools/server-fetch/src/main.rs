//! fetch-workflow-server
//!
//! Downloads the workflow example GLSP server next to the extension.

use std::cell::Cell;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use glsp_server_fetch::{ArtifactCoordinates, FetchConfig, fetch_artifact, run_command};

#[derive(Parser)]
#[command(name = "fetch-workflow-server")]
#[command(about = "Download the GLSP workflow example server", version)]
struct Cli {
    /// Fetch the latest snapshot build instead of the release
    #[arg(long)]
    snapshot: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Download failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = FetchConfig {
        coordinates: ArtifactCoordinates::workflow_server().with_snapshot(cli.snapshot),
        ..Default::default()
    };

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create runtime")?;

    tracing::info!(
        "Downloading latest version of the Workflow Example Java Server from the maven repository..."
    );

    // Every 10%
    let last_step = Cell::new(0u32);
    let path = rt
        .block_on(fetch_artifact(&config, |fraction| {
            let step = (fraction * 10.0) as u32;
            if step > last_step.get() {
                last_step.set(step);
                tracing::debug!("{}%", step * 10);
            }
        }))
        .with_context(|| format!("Failed to fetch {}", config.coordinates.file_name()))?;

    tracing::info!(
        "Download completed ({}). Start the server using this command:\n{}",
        path.display(),
        run_command(&config.coordinates)
    );
    Ok(())
}
