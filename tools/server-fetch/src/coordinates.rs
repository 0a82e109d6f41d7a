//! Maven coordinates of the workflow example server

use reqwest::Url;

use crate::fetch::FetchError;

/// Public Maven repository the server is published to
pub const MAVEN_CENTRAL: &str = "https://repo1.maven.org/maven2/";

/// Main class passed to `java -jar` to start the server
pub const LAUNCHER_CLASS: &str = "org.eclipse.glsp.example.workflow.launch.ExampleServerLauncher";

/// A (group, artifact, version, classifier) tuple of a jar artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCoordinates {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub classifier: String,
    /// Resolve `<version>-SNAPSHOT` instead of the release
    pub snapshot: bool,
}

/// Timestamped build of a snapshot version, from `maven-metadata.xml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotBuild {
    pub timestamp: String,
    pub build_number: String,
}

impl ArtifactCoordinates {
    /// The GLSP workflow example server
    pub fn workflow_server() -> Self {
        Self {
            group_id: "org.eclipse.glsp.example".to_string(),
            artifact_id: "org.eclipse.glsp.example.workflow".to_string(),
            version: "1.0.0".to_string(),
            classifier: "glsp".to_string(),
            snapshot: false,
        }
    }

    pub fn with_snapshot(mut self, snapshot: bool) -> Self {
        self.snapshot = snapshot;
        self
    }

    /// Version directory name in the repository
    pub fn resolved_version(&self) -> String {
        if self.snapshot {
            format!("{}-SNAPSHOT", self.version)
        } else {
            self.version.clone()
        }
    }

    /// Repository-relative directory holding this version, with trailing slash
    pub fn directory_path(&self) -> String {
        format!(
            "{}/{}/{}/",
            self.group_id.replace('.', "/"),
            self.artifact_id,
            self.resolved_version()
        )
    }

    /// Local (and, for releases, remote) jar file name
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}-{}.jar",
            self.artifact_id,
            self.resolved_version(),
            self.classifier
        )
    }

    /// Remote file name of a timestamped snapshot build
    pub fn snapshot_file_name(&self, build: &SnapshotBuild) -> String {
        format!(
            "{}-{}-{}-{}-{}.jar",
            self.artifact_id, self.version, build.timestamp, build.build_number, self.classifier
        )
    }

    pub fn metadata_path(&self) -> String {
        format!("{}maven-metadata.xml", self.directory_path())
    }

    /// Remote URL of the jar named by [`Self::file_name`]
    pub fn artifact_url(&self, repository: &str) -> Result<Url, FetchError> {
        resolve(repository, &format!("{}{}", self.directory_path(), self.file_name()))
    }

    /// Remote URL of a timestamped snapshot jar
    pub fn snapshot_artifact_url(
        &self,
        repository: &str,
        build: &SnapshotBuild,
    ) -> Result<Url, FetchError> {
        resolve(
            repository,
            &format!("{}{}", self.directory_path(), self.snapshot_file_name(build)),
        )
    }

    pub fn metadata_url(&self, repository: &str) -> Result<Url, FetchError> {
        resolve(repository, &self.metadata_path())
    }
}

/// Join a repository-relative path onto an http(s) repository base URL
fn resolve(repository: &str, path: &str) -> Result<Url, FetchError> {
    let invalid = || FetchError::InvalidRepository(repository.to_string());
    // `Url::join` replaces the last segment unless the base ends in '/'
    let base = if repository.ends_with('/') {
        Url::parse(repository)
    } else {
        Url::parse(&format!("{repository}/"))
    }
    .map_err(|_| invalid())?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(invalid());
    }
    base.join(path).map_err(|_| invalid())
}

/// Console command that starts the downloaded server
pub fn run_command(coordinates: &ArtifactCoordinates) -> String {
    format!("java -jar {} {}", coordinates.file_name(), LAUNCHER_CLASS)
}
