//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::defaults;

/// telemetry-dispatch: device telemetry query tool
///
/// Answers named telemetry queries (memory, battery, network addresses, ...)
/// from on-device providers, one-shot or as a JSON-lines service.
#[derive(Debug, Parser)]
#[command(name = "telemetry-dispatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<CliCommand>,

    /// Endpoint returning the public address as plain text
    #[arg(long = "public-ip-url", global = true)]
    pub public_ip_url: Option<String>,

    /// Connect timeout for the public address lookup, in milliseconds
    #[arg(long = "connect-timeout-ms", global = true)]
    pub connect_timeout_ms: Option<u64>,

    /// Read timeout for the public address lookup, in milliseconds
    #[arg(long = "read-timeout-ms", global = true)]
    pub read_timeout_ms: Option<u64>,

    /// Filesystem root for host providers (sysfs, /etc)
    #[arg(long = "host-root", global = true)]
    pub host_root: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for telemetry-dispatch
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum CliCommand {
    /// Answer a single command and print the response as JSON
    Query {
        /// Wire name of the command (e.g. getRamInfo)
        name: String,
    },
    /// Read JSON-lines requests from stdin and write responses to stdout
    Serve,
    /// List the supported command names
    List,
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = defaults::CONFIG_FILE)]
        output: PathBuf,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns the subcommand, defaulting to `serve`.
    #[must_use]
    pub fn command_or_default(&self) -> CliCommand {
        self.command.clone().unwrap_or(CliCommand::Serve)
    }
}
