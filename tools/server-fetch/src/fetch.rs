//! Artifact download from a Maven repository

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

use crate::coordinates::{ArtifactCoordinates, MAVEN_CENTRAL};
use crate::maven::parse_snapshot_metadata;

/// Directory the server jar is placed in, relative to the working directory
pub const DEFAULT_DEST_DIR: &str = "extension/server";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("Invalid repository URL '{0}'")]
    InvalidRepository(String),
}

/// Where to fetch from and where to put the result
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Repository base URL
    pub repository: String,
    pub coordinates: ArtifactCoordinates,
    pub dest_dir: PathBuf,
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            repository: MAVEN_CENTRAL.to_string(),
            coordinates: ArtifactCoordinates::workflow_server(),
            dest_dir: PathBuf::from(DEFAULT_DEST_DIR),
            timeout: Duration::from_secs(300),
        }
    }
}

impl FetchConfig {
    /// Local path of the downloaded jar
    pub fn destination(&self) -> PathBuf {
        self.dest_dir.join(self.coordinates.file_name())
    }

    /// Release and snapshot jars a previous run may have left behind
    pub fn stale_paths(&self) -> [PathBuf; 2] {
        let release = self.coordinates.clone().with_snapshot(false);
        let snapshot = self.coordinates.clone().with_snapshot(true);
        [
            self.dest_dir.join(release.file_name()),
            self.dest_dir.join(snapshot.file_name()),
        ]
    }
}

/// Download the configured artifact and return its local path.
///
/// Any previously downloaded jar (release or snapshot) is deleted first, so
/// a failed fetch never leaves a stale server behind.
pub async fn fetch_artifact<F>(config: &FetchConfig, on_progress: F) -> Result<PathBuf, FetchError>
where
    F: Fn(f32),
{
    for stale in config.stale_paths() {
        remove_stale(&stale)?;
    }
    let destination = config.destination();

    let client = reqwest::Client::builder().timeout(config.timeout).build()?;

    let url = if config.coordinates.snapshot {
        resolve_snapshot_url(&client, config).await?
    } else {
        config.coordinates.artifact_url(&config.repository)?
    };

    std::fs::create_dir_all(&config.dest_dir)?;
    tracing::info!("Downloading {}", url);
    download(&client, url, &destination, on_progress).await?;
    tracing::info!("Saved {}", destination.display());

    Ok(destination)
}

fn remove_stale(path: &Path) -> Result<(), FetchError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!("Removed previous download {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Remote URL of the latest snapshot build.
///
/// Falls back to the plain `-SNAPSHOT` jar when the metadata is missing or
/// lists no timestamped build.
async fn resolve_snapshot_url(
    client: &reqwest::Client,
    config: &FetchConfig,
) -> Result<Url, FetchError> {
    let coords = &config.coordinates;
    let url = coords.metadata_url(&config.repository)?;

    let response = client.get(url.clone()).send().await?;
    if !response.status().is_success() {
        tracing::warn!(
            "No snapshot metadata at {} (HTTP {}), using {}",
            url,
            response.status(),
            coords.file_name()
        );
        return coords.artifact_url(&config.repository);
    }

    let xml = response.text().await?;
    match parse_snapshot_metadata(&xml) {
        Some(build) => {
            tracing::info!(
                "Latest snapshot build {}-{}",
                build.timestamp,
                build.build_number
            );
            coords.snapshot_artifact_url(&config.repository, &build)
        }
        None => {
            tracing::warn!("Snapshot metadata lists no build, using {}", coords.file_name());
            coords.artifact_url(&config.repository)
        }
    }
}

async fn download<F>(
    client: &reqwest::Client,
    url: Url,
    destination: &Path,
    on_progress: F,
) -> Result<(), FetchError>
where
    F: Fn(f32),
{
    let mut response = client.get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let total_size = response.content_length().filter(|&len| len > 0);
    let mut downloaded: u64 = 0;
    let mut file = std::fs::File::create(destination)?;

    let written = async {
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk)?;
            downloaded += chunk.len() as u64;
            if let Some(total) = total_size {
                on_progress((downloaded as f32 / total as f32).min(1.0));
            }
        }
        file.flush()?;
        Ok::<_, FetchError>(())
    }
    .await;

    if let Err(e) = written {
        drop(file);
        // Partial jars would look like a finished download
        let _ = std::fs::remove_file(destination);
        return Err(e);
    }

    on_progress(1.0);
    tracing::debug!("Downloaded {} bytes", downloaded);
    Ok(())
}
