//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

/// Default public-address echo endpoint. Returns the caller's address as plain text.
pub const PUBLIC_IP_URL: &str = "https://api.ipify.org?format=text";

/// Default connect timeout in milliseconds.
pub const CONNECT_TIMEOUT_MS: u64 = 5000;

/// Default read timeout in milliseconds.
pub const READ_TIMEOUT_MS: u64 = 5000;

/// Default filesystem root for host providers.
pub const HOST_ROOT: &str = "/";

/// Default configuration file name written by `init`.
pub const CONFIG_FILE: &str = "telemetry-dispatch.toml";

/// Default connect timeout as Duration.
#[must_use]
pub const fn connect_timeout() -> Duration {
    Duration::from_millis(CONNECT_TIMEOUT_MS)
}

/// Default read timeout as Duration.
#[must_use]
pub const fn read_timeout() -> Duration {
    Duration::from_millis(READ_TIMEOUT_MS)
}
