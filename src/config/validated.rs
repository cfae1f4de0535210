//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::fetch::FetchTimeouts;
use crate::provider::host::{HostPaths, InstalledAppsProvider};

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    /// Public address echo endpoint
    pub public_ip_url: Url,

    /// Connect and read bounds for the public address lookup
    pub timeouts: FetchTimeouts,

    /// Where host providers read platform data
    pub host: HostPaths,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {{ public_ip_url: {}, connect_timeout: {}ms, read_timeout: {}ms, \
             host_root: {}, application_dirs: {} }}",
            self.public_ip_url,
            self.timeouts.connect.as_millis(),
            self.timeouts.read.as_millis(),
            self.host.root.display(),
            self.host.application_dirs.len(),
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The URL is invalid or not http/https
    /// - A timeout is zero
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let public_ip_url = Self::resolve_url(cli, toml)?;
        let timeouts = Self::resolve_timeouts(cli, toml)?;
        let host = Self::resolve_host(cli, toml);

        // Flags only enable: true in either source wins
        let verbose = cli.verbose || toml.is_some_and(|t| t.log.verbose);

        Ok(Self {
            public_ip_url,
            timeouts,
            host,
            verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_url(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Url, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let url_str = cli
            .public_ip_url
            .as_deref()
            .or_else(|| toml.and_then(|t| t.public_ip.url.as_deref()))
            .unwrap_or(defaults::PUBLIC_IP_URL);

        let url = Url::parse(url_str).map_err(|e| ConfigError::InvalidUrl {
            url: url_str.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(ConfigError::InvalidUrl {
                url: url_str.to_string(),
                reason: format!("unsupported scheme '{scheme}', expected http or https"),
            }),
        }
    }

    fn resolve_timeouts(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<FetchTimeouts, ConfigError> {
        let section = toml.map(|t| &t.public_ip);

        let connect = cli
            .connect_timeout_ms
            .or_else(|| section.and_then(|s| s.connect_timeout_ms))
            .unwrap_or(defaults::CONNECT_TIMEOUT_MS);
        let read = cli
            .read_timeout_ms
            .or_else(|| section.and_then(|s| s.read_timeout_ms))
            .unwrap_or(defaults::READ_TIMEOUT_MS);

        Ok(FetchTimeouts::new(
            positive_millis(field::CONNECT_TIMEOUT, connect)?,
            positive_millis(field::READ_TIMEOUT, read)?,
        ))
    }

    fn resolve_host(cli: &Cli, toml: Option<&TomlConfig>) -> HostPaths {
        let section = toml.map(|t| &t.host);

        let root = cli
            .host_root
            .clone()
            .or_else(|| section.and_then(|s| s.root.clone()))
            .unwrap_or_else(|| PathBuf::from(defaults::HOST_ROOT));

        // TOML list replaces the defaults entirely
        let application_dirs = section
            .and_then(|s| s.application_dirs.clone())
            .unwrap_or_else(|| InstalledAppsProvider::default_dirs(&root));

        HostPaths {
            root,
            application_dirs,
        }
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

fn positive_millis(field: &'static str, millis: u64) -> Result<Duration, ConfigError> {
    if millis == 0 {
        return Err(ConfigError::InvalidDuration {
            field,
            reason: "must be greater than 0".to_string(),
        });
    }
    Ok(Duration::from_millis(millis))
}
