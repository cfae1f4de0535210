//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Public address lookup configuration
    #[serde(default)]
    pub public_ip: PublicIpSection,

    /// Host provider configuration
    #[serde(default)]
    pub host: HostSection,

    /// Logging configuration
    #[serde(default)]
    pub log: LogSection,
}

/// Public address lookup section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublicIpSection {
    /// Echo endpoint URL
    pub url: Option<String>,

    /// Connect timeout in milliseconds
    pub connect_timeout_ms: Option<u64>,

    /// Read timeout in milliseconds
    pub read_timeout_ms: Option<u64>,
}

/// Host provider section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostSection {
    /// Filesystem root for sysfs and /etc lookups
    pub root: Option<PathBuf>,

    /// Directories scanned for installed applications.
    /// Replaces the default list when present.
    pub application_dirs: Option<Vec<PathBuf>>,
}

/// Logging section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSection {
    /// Enable verbose logging
    #[serde(default)]
    pub verbose: bool,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# telemetry-dispatch configuration file

[public_ip]
# Endpoint returning the caller's public address as plain text
url = "https://api.ipify.org?format=text"

# Connect timeout in milliseconds (default: 5000)
connect_timeout_ms = 5000

# Read timeout in milliseconds (default: 5000)
# The lookup as a whole is bounded by connect + read.
read_timeout_ms = 5000

[host]
# Filesystem root for sysfs and /etc lookups (default: "/")
# root = "/"

# Directories scanned for installed applications (*.desktop entries)
# Replaces the default list: ~/.local/share/applications plus Flatpak and Snap exports
# application_dirs = ["/var/lib/flatpak/exports/share/applications"]

[log]
# Enable verbose (debug) logging
# verbose = false
"#
    .to_string()
}
