//! Interface snapshots and the enumeration trait.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for interface enumeration.
///
/// Describes what went wrong without dictating recovery strategy.
#[derive(Debug, Error)]
pub enum EnumerateError {
    /// Platform-specific error with a generic message.
    #[error("Platform error: {message}")]
    Platform {
        /// Error message describing the platform-specific failure.
        message: String,
    },
}

/// A snapshot of one network interface's bound addresses.
///
/// Address order is the order the platform reported them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceSnapshot {
    /// Interface name (e.g. "eth0", "wlan0").
    pub name: String,
    /// All addresses bound to this interface, IPv4 and IPv6 mixed.
    pub addresses: Vec<IpAddr>,
}

impl InterfaceSnapshot {
    /// Creates a new interface snapshot.
    #[must_use]
    pub fn new(name: impl Into<String>, addresses: Vec<IpAddr>) -> Self {
        Self {
            name: name.into(),
            addresses,
        }
    }
}

/// Trait for enumerating network interfaces.
///
/// # Design
///
/// - Enables dependency injection for testing with fixed interface lists
/// - The host implementation lives in [`super::platform`]
///
/// # Example
///
/// ```
/// use telemetry_dispatch::network::{EnumerateError, InterfaceEnumerator, InterfaceSnapshot};
///
/// struct Fixed(Vec<InterfaceSnapshot>);
///
/// impl InterfaceEnumerator for Fixed {
///     fn interfaces(&self) -> Result<Vec<InterfaceSnapshot>, EnumerateError> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
pub trait InterfaceEnumerator: Send + Sync {
    /// Lists all interfaces with their addresses.
    ///
    /// # Errors
    ///
    /// Returns [`EnumerateError`] when the platform refuses or fails to
    /// report interfaces.
    ///
    /// # Implementation Notes
    ///
    /// - Return ALL interfaces, loopback included; filtering is done by the caller
    /// - Enumeration order is platform-defined
    fn interfaces(&self) -> Result<Vec<InterfaceSnapshot>, EnumerateError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_snapshot_with_correct_fields() {
        let snapshot = InterfaceSnapshot::new("eth0", vec!["192.168.1.5".parse().unwrap()]);

        assert_eq!(snapshot.name, "eth0");
        assert_eq!(snapshot.addresses.len(), 1);
    }

    #[test]
    fn equality_requires_same_address_order() {
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();

        assert_ne!(
            InterfaceSnapshot::new("eth0", vec![a, b]),
            InterfaceSnapshot::new("eth0", vec![b, a])
        );
    }

    #[test]
    fn platform_error_displays_message() {
        let error = EnumerateError::Platform {
            message: "netlink socket closed".to_string(),
        };
        assert_eq!(error.to_string(), "Platform error: netlink socket closed");
    }
}
