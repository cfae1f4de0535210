//! Command names and request values.
//!
//! The command surface is a fixed, string-keyed set. Names are matched
//! exactly (case-sensitive), so `getraminfo` is not `getRamInfo`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A telemetry category the dispatcher knows how to answer.
///
/// Every variant except [`Command::PublicIpAddress`] is answered
/// synchronously on the caller's thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Command {
    /// Stable device identifier.
    DeviceInfo,
    /// Total and available memory.
    RamInfo,
    /// Attached camera devices.
    CameraInfo,
    /// Manufacturer and model metadata.
    ManufacturerInfo,
    /// Operating system build/version metadata.
    VersionInfo,
    /// Battery level and state.
    BatteryInfo,
    /// Radio and power mode flags.
    DeviceModeInfo,
    /// Host-level system information.
    SystemInfo,
    /// First private (site-local) interface address.
    PrivateIpAddress,
    /// Public address as seen by an external echo service.
    PublicIpAddress,
    /// Non-system installed applications.
    InstalledApps,
}

impl Command {
    /// All supported commands, in wire-table order.
    pub const ALL: [Self; 11] = [
        Self::DeviceInfo,
        Self::RamInfo,
        Self::CameraInfo,
        Self::ManufacturerInfo,
        Self::VersionInfo,
        Self::BatteryInfo,
        Self::DeviceModeInfo,
        Self::SystemInfo,
        Self::PrivateIpAddress,
        Self::PublicIpAddress,
        Self::InstalledApps,
    ];

    /// Returns the wire name of this command.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DeviceInfo => "getDeviceInfo",
            Self::RamInfo => "getRamInfo",
            Self::CameraInfo => "getCameraInfo",
            Self::ManufacturerInfo => "getManufacturerInfo",
            Self::VersionInfo => "versionInfo",
            Self::BatteryInfo => "getBatteryInfo",
            Self::DeviceModeInfo => "getDeviceModeInfo",
            Self::SystemInfo => "getSystemInfo",
            Self::PrivateIpAddress => "getPrivateIPAddress",
            Self::PublicIpAddress => "getPublicIPAddress",
            Self::InstalledApps => "getInstalledApps",
        }
    }

    /// Returns true if the response is delivered later through a completion
    /// callback instead of before `dispatch` returns.
    #[must_use]
    pub const fn is_async(self) -> bool {
        matches!(self, Self::PublicIpAddress)
    }

    /// Iterates over the commands answered by synchronous providers.
    pub fn synchronous() -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(|c| !c.is_async())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a name is not part of the command set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported command: {0}")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| UnknownCommand(s.to_string()))
    }
}

/// A single request: a command name plus optional arguments.
///
/// The name is kept as the raw string the caller sent so that an
/// unrecognised name can be reported back verbatim. Arguments are carried
/// through for forward compatibility; no current command reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Wire name of the command.
    pub command: String,
    /// Optional argument mapping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Request {
    /// Creates a request without arguments.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            arguments: None,
        }
    }

    /// Attaches an argument mapping.
    #[must_use]
    pub fn with_arguments(mut self, arguments: serde_json::Map<String, serde_json::Value>) -> Self {
        self.arguments = Some(arguments);
        self
    }

    /// Resolves the command name against the supported set.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownCommand`] if the name does not match exactly.
    pub fn resolve(&self) -> Result<Command, UnknownCommand> {
        self.command.parse()
    }
}

impl From<Command> for Request {
    fn from(command: Command) -> Self {
        Self::new(command.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod command {
        use super::*;

        #[test]
        fn every_name_parses_back_to_its_command() {
            for command in Command::ALL {
                assert_eq!(command.name().parse::<Command>(), Ok(command));
            }
        }

        #[test]
        fn names_are_unique() {
            let mut names: Vec<_> = Command::ALL.iter().map(|c| c.name()).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), Command::ALL.len());
        }

        #[test]
        fn matching_is_case_sensitive() {
            let result = "getraminfo".parse::<Command>();
            assert_eq!(result, Err(UnknownCommand("getraminfo".to_string())));
        }

        #[test]
        fn surrounding_whitespace_is_not_trimmed() {
            assert!(" getRamInfo".parse::<Command>().is_err());
        }

        #[test]
        fn only_public_address_is_async() {
            let async_commands: Vec<_> = Command::ALL.into_iter().filter(|c| c.is_async()).collect();
            assert_eq!(async_commands, vec![Command::PublicIpAddress]);
        }

        #[test]
        fn synchronous_excludes_async_command() {
            assert_eq!(Command::synchronous().count(), 10);
            assert!(Command::synchronous().all(|c| !c.is_async()));
        }

        #[test]
        fn display_uses_wire_name() {
            assert_eq!(Command::VersionInfo.to_string(), "versionInfo");
            assert_eq!(
                Command::PrivateIpAddress.to_string(),
                "getPrivateIPAddress"
            );
        }

        #[test]
        fn unknown_command_displays_name() {
            let error = UnknownCommand("reboot".to_string());
            assert_eq!(error.to_string(), "Unsupported command: reboot");
        }
    }

    mod request {
        use super::*;

        #[test]
        fn deserializes_without_arguments() {
            let request: Request = serde_json::from_str(r#"{"command":"getRamInfo"}"#).unwrap();

            assert_eq!(request.command, "getRamInfo");
            assert!(request.arguments.is_none());
            assert_eq!(request.resolve(), Ok(Command::RamInfo));
        }

        #[test]
        fn deserializes_with_arguments() {
            let request: Request =
                serde_json::from_str(r#"{"command":"getCameraInfo","arguments":{"verbose":true}}"#)
                    .unwrap();

            let arguments = request.arguments.unwrap();
            assert_eq!(arguments.get("verbose"), Some(&serde_json::Value::Bool(true)));
        }

        #[test]
        fn resolve_reports_unknown_name_verbatim() {
            let request = Request::new("getWeather");
            assert_eq!(
                request.resolve(),
                Err(UnknownCommand("getWeather".to_string()))
            );
        }

        #[test]
        fn from_command_uses_wire_name() {
            let request = Request::from(Command::InstalledApps);
            assert_eq!(request.command, "getInstalledApps");
            assert!(request.arguments.is_none());
        }
    }
}
