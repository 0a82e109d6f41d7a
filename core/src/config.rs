//! Collaboration configuration (collaboration.toml)
//!
//! Every field defaults to the wire constants in `glsp_collab_shared`, so an
//! absent or partial file behaves exactly like the stock channel. Overrides
//! exist for embedding and tests. Peers must agree on `service_name` and
//! `host_subclient_id`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use glsp_collab_shared::{COLORS, FALLBACK_COLOR, SERVICE_NAME, SUBCLIENT_HOST_ID};

const CONFIG_FILE: &str = "collaboration.toml";

/// Relay configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaborationConfig {
    /// Shared service name (default: GLSP-LIVESHARE-SERVICE)
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Subclient id assigned to the host
    #[serde(default = "default_host_subclient_id")]
    pub host_subclient_id: String,
    /// Participant colors, host first
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
    /// Color for guests beyond the palette
    #[serde(default = "default_fallback_color")]
    pub fallback_color: String,
}

fn default_service_name() -> String {
    SERVICE_NAME.to_string()
}
fn default_host_subclient_id() -> String {
    SUBCLIENT_HOST_ID.to_string()
}
fn default_palette() -> Vec<String> {
    COLORS.iter().map(|c| c.to_string()).collect()
}
fn default_fallback_color() -> String {
    FALLBACK_COLOR.to_string()
}

impl Default for CollaborationConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            host_subclient_id: default_host_subclient_id(),
            palette: default_palette(),
            fallback_color: default_fallback_color(),
        }
    }
}

impl CollaborationConfig {
    /// Parse from TOML text. Missing fields take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Returns the platform-specific configuration directory.
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("org.eclipse", "glsp", "glsp-collab")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Loads the configuration from disk.
///
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> CollaborationConfig {
    match config_dir() {
        Some(dir) => load_from(&dir.join(CONFIG_FILE)),
        None => CollaborationConfig::default(),
    }
}

/// Loads a configuration file at an explicit path, falling back to defaults.
pub fn load_from(path: &Path) -> CollaborationConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => CollaborationConfig::from_toml_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Ignoring malformed {}: {}", path.display(), e);
            CollaborationConfig::default()
        }),
        Err(_) => CollaborationConfig::default(),
    }
}

/// Saves the configuration to disk, creating the directory if needed.
pub fn save(config: &CollaborationConfig) -> std::io::Result<()> {
    match config_dir() {
        Some(dir) => save_to(&dir.join(CONFIG_FILE), config),
        None => Ok(()),
    }
}

pub fn save_to(path: &Path, config: &CollaborationConfig) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let content = toml::to_string_pretty(config).map_err(std::io::Error::other)?;
    std::fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_wire_constants() {
        let config = CollaborationConfig::default();
        assert_eq!(config.service_name, "GLSP-LIVESHARE-SERVICE");
        assert_eq!(config.host_subclient_id, SUBCLIENT_HOST_ID);
        assert_eq!(config.palette, vec!["#5C2D91", "#FFF100", "#E3008C", "#FF8C00"]);
        assert_eq!(config.fallback_color, "#FFFFFF");
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = CollaborationConfig::from_toml_str("").unwrap();
        assert_eq!(config, CollaborationConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let config = CollaborationConfig::from_toml_str(
            r##"
            palette = ["#000000", "#111111"]
            fallback_color = "#EEEEEE"
            "##,
        )
        .unwrap();
        assert_eq!(config.service_name, SERVICE_NAME);
        assert_eq!(config.palette.len(), 2);
        assert_eq!(config.fallback_color, "#EEEEEE");
    }

    #[test]
    fn roundtrips_through_toml() {
        let config = CollaborationConfig {
            service_name: "TEST-SERVICE".into(),
            ..Default::default()
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(CollaborationConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let config = CollaborationConfig {
            host_subclient_id: "host".into(),
            ..Default::default()
        };

        save_to(&path, &config).unwrap();
        assert_eq!(load_from(&path), config);
    }

    #[test]
    fn missing_or_malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        assert_eq!(load_from(&path), CollaborationConfig::default());

        std::fs::write(&path, "palette = 3").unwrap();
        assert_eq!(load_from(&path), CollaborationConfig::default());
    }
}
