//! Host implementations of every synchronous provider.
//!
//! Filesystem-backed providers resolve their paths under an injectable
//! root (normally `/`), so tests can point them at a temporary directory
//! laid out like sysfs.
//!
//! # Platform Support
//!
//! - **Linux**: full support (sysfs, `/etc/machine-id`, XDG desktop entries).
//! - **Other**: `sysinfo`-backed providers work. Device id, battery and
//!   manufacturer report [`ProviderError::Unavailable`](super::ProviderError::Unavailable);
//!   cameras, device mode and installed apps report empty values.

mod apps;
mod sysfs;
mod system;


use std::path::PathBuf;

pub use apps::InstalledAppsProvider;
pub use sysfs::{
    BatteryProvider, CameraProvider, DeviceIdProvider, DeviceModeProvider, ManufacturerProvider,
};
pub use system::{MemoryProvider, SystemInfoProvider, VersionProvider};

use crate::command::Command;
use crate::dispatch::DispatcherBuilder;
use crate::network::PrivateAddressResolver;
use crate::network::platform::SysinfoEnumerator;

/// Where host providers look for platform data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPaths {
    /// Filesystem root for sysfs and `/etc` lookups.
    pub root: PathBuf,
    /// Directories scanned for installed application entries.
    pub application_dirs: Vec<PathBuf>,
}

/// Registers a host provider for every synchronous command.
#[must_use]
pub fn install<H>(builder: DispatcherBuilder<H>, paths: &HostPaths) -> DispatcherBuilder<H> {
    let root = &paths.root;

    builder
        .provider(Command::DeviceInfo, DeviceIdProvider::new(root))
        .provider(Command::RamInfo, MemoryProvider)
        .provider(Command::CameraInfo, CameraProvider::new(root))
        .provider(Command::ManufacturerInfo, ManufacturerProvider::new(root))
        .provider(Command::VersionInfo, VersionProvider)
        .provider(Command::BatteryInfo, BatteryProvider::new(root))
        .provider(Command::DeviceModeInfo, DeviceModeProvider::new(root))
        .provider(Command::SystemInfo, SystemInfoProvider)
        .provider(
            Command::PrivateIpAddress,
            PrivateAddressResolver::new(SysinfoEnumerator::new()),
        )
        .provider(
            Command::InstalledApps,
            InstalledAppsProvider::new(paths.application_dirs.clone()),
        )
}
