//! Fetches the GLSP workflow example server jar from Maven
//!
//! The binary (`fetch-workflow-server`) downloads into `extension/server`
//! and prints the command that starts the server. The library half is
//! reused by tests against a local HTTP server.

pub mod coordinates;
pub mod fetch;
pub mod maven;

pub use coordinates::{ArtifactCoordinates, LAUNCHER_CLASS, MAVEN_CENTRAL, SnapshotBuild, run_command};
pub use fetch::{DEFAULT_DEST_DIR, FetchConfig, FetchError, fetch_artifact};
pub use maven::parse_snapshot_metadata;
