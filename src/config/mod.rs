//! Configuration layer for the telemetry-dispatch binary.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`CliCommand`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! The dispatcher library itself takes no configuration; everything here
//! feeds the runner.
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! `host.application_dirs` is TOML-only and replaces the default directory
//! list entirely when present.
//!
//! # Boolean Flag Semantics
//!
//! `--verbose` uses OR semantics: if set in either CLI or TOML, the result
//! is `true`.

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;


pub use cli::{Cli, CliCommand};
pub use error::ConfigError;
pub use toml::{TomlConfig, default_config_template};
pub use validated::{ValidatedConfig, write_default_config};
