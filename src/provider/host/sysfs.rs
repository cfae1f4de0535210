//! Providers backed by files under `/etc` and `/sys`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::provider::{InfoProvider, ProviderError, Value};

const MACHINE_ID_PATHS: [&str; 2] = ["etc/machine-id", "var/lib/dbus/machine-id"];
const VIDEO_CLASS: &str = "sys/class/video4linux";
const DMI_ID: &str = "sys/class/dmi/id";
const POWER_SUPPLY_CLASS: &str = "sys/class/power_supply";
const RFKILL_CLASS: &str = "sys/class/rfkill";

/// DMI attribute file → map key.
const DMI_FIELDS: [(&str, &str); 6] = [
    ("sys_vendor", "manufacturer"),
    ("product_name", "model"),
    ("product_version", "version"),
    ("board_vendor", "brand"),
    ("board_name", "board"),
    ("bios_version", "bios"),
];

/// Reads a single-line attribute file, trimmed.
///
/// Returns `Ok(None)` if the file does not exist.
fn read_attribute(path: &Path) -> Result<Option<String>, ProviderError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents.trim().to_string())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ProviderError::read(path, e)),
    }
}

/// Reads an attribute the kernel may decline to report.
///
/// Any read error counts as absent. Drivers commonly answer `ENODATA` or
/// `EIO` for attributes they expose but cannot fill.
fn read_optional_attribute(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(contents) => Some(contents.trim().to_string()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Optional attribute unreadable");
            None
        }
    }
}

/// Lists the entries of a sysfs class directory, sorted by name.
///
/// A missing directory yields no entries.
fn class_entries(dir: &Path) -> Result<Vec<PathBuf>, ProviderError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ProviderError::read(dir, e)),
    };

    let mut paths = entries
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ProviderError::read(dir, e))?;
    paths.sort();
    Ok(paths)
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Stable device identifier from the systemd/D-Bus machine id.
#[derive(Debug, Clone)]
pub struct DeviceIdProvider {
    root: PathBuf,
}

impl DeviceIdProvider {
    /// Creates a provider reading under `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl InfoProvider for DeviceIdProvider {
    fn fetch(&self) -> Result<Value, ProviderError> {
        for relative in MACHINE_ID_PATHS {
            let path = self.root.join(relative);
            let Some(id) = read_attribute(&path)? else {
                continue;
            };
            if id.is_empty() {
                return Err(ProviderError::Malformed {
                    path,
                    reason: "machine id is empty".to_string(),
                });
            }
            return Ok(Value::Text(id));
        }

        Err(ProviderError::Unavailable {
            what: "device identifier",
        })
    }
}

/// Attached video capture devices.
///
/// Produces `"Cameras: <name>, <name>"`, one name per device node. A node
/// without a readable `name` attribute is listed by its node name.
#[derive(Debug, Clone)]
pub struct CameraProvider {
    root: PathBuf,
}

impl CameraProvider {
    /// Creates a provider reading under `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl InfoProvider for CameraProvider {
    fn fetch(&self) -> Result<Value, ProviderError> {
        let mut names = Vec::new();
        for node in class_entries(&self.root.join(VIDEO_CLASS))? {
            let name = read_attribute(&node.join("name"))?
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| entry_name(&node));
            names.push(name);
        }

        Ok(Value::Text(format!("Cameras: {}", names.join(", "))))
    }
}

/// Manufacturer, model and firmware metadata from DMI.
#[derive(Debug, Clone)]
pub struct ManufacturerProvider {
    root: PathBuf,
}

impl ManufacturerProvider {
    /// Creates a provider reading under `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl InfoProvider for ManufacturerProvider {
    fn fetch(&self) -> Result<Value, ProviderError> {
        let dir = self.root.join(DMI_ID);
        if !dir.is_dir() {
            return Err(ProviderError::Unavailable {
                what: "manufacturer information",
            });
        }

        let mut fields = Vec::new();
        for (file, key) in DMI_FIELDS {
            if let Some(value) = read_attribute(&dir.join(file))?.filter(|v| !v.is_empty()) {
                fields.push((key, value));
            }
        }

        Ok(fields.into_iter().collect())
    }
}

/// A power supply entry and its declared type.
struct PowerSupply {
    path: PathBuf,
    kind: String,
}

impl PowerSupply {
    fn online(&self) -> Result<bool, ProviderError> {
        Ok(read_attribute(&self.path.join("online"))?.as_deref() == Some("1"))
    }
}

fn power_supplies(root: &Path) -> Result<Vec<PowerSupply>, ProviderError> {
    let mut supplies = Vec::new();
    for path in class_entries(&root.join(POWER_SUPPLY_CLASS))? {
        let kind = read_attribute(&path.join("type"))?.unwrap_or_default();
        supplies.push(PowerSupply { path, kind });
    }
    Ok(supplies)
}

/// Battery level and charging state.
///
/// Reads the first power supply whose type is `Battery`. Keys:
/// `level` (percent), `status`, `charging`, `health`, `technology`, `plugged`.
#[derive(Debug, Clone)]
pub struct BatteryProvider {
    root: PathBuf,
}

impl BatteryProvider {
    /// Creates a provider reading under `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl InfoProvider for BatteryProvider {
    fn fetch(&self) -> Result<Value, ProviderError> {
        let supplies = power_supplies(&self.root)?;
        let battery = supplies
            .iter()
            .find(|s| s.kind == "Battery")
            .ok_or(ProviderError::Unavailable { what: "battery" })?;

        let mut fields = Vec::new();

        let capacity_path = battery.path.join("capacity");
        if let Some(capacity) = read_attribute(&capacity_path)? {
            let level: u8 = capacity.parse().map_err(|_| ProviderError::Malformed {
                path: capacity_path.clone(),
                reason: format!("expected a percentage, got '{capacity}'"),
            })?;
            fields.push(("level", level.to_string()));
        }

        let status = read_attribute(&battery.path.join("status"))?;
        if let Some(status) = &status {
            fields.push(("status", status.clone()));
        }
        let charging = matches!(status.as_deref(), Some("Charging" | "Full"));
        fields.push(("charging", charging.to_string()));

        for (file, key) in [("health", "health"), ("technology", "technology")] {
            if let Some(value) = read_optional_attribute(&battery.path.join(file)) {
                fields.push((key, value));
            }
        }

        let mut plugged = false;
        for supply in supplies.iter().filter(|s| s.kind == "Mains" || s.kind == "USB") {
            plugged |= supply.online()?;
        }
        fields.push(("plugged", plugged.to_string()));

        Ok(fields.into_iter().collect())
    }
}

/// Radio and power mode flags.
///
/// Keys: `airplane_mode`, `wifi_enabled`, `bluetooth_enabled`,
/// `power_source` (`ac`, `battery` or `unknown`).
///
/// Airplane mode is on when at least one radio exists and every radio is
/// soft-blocked.
#[derive(Debug, Clone)]
pub struct DeviceModeProvider {
    root: PathBuf,
}

impl DeviceModeProvider {
    /// Creates a provider reading under `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

/// One rfkill switch.
struct Radio {
    kind: String,
    blocked: bool,
}

fn radios(root: &Path) -> Result<Vec<Radio>, ProviderError> {
    let mut radios = Vec::new();
    for path in class_entries(&root.join(RFKILL_CLASS))? {
        let kind = read_attribute(&path.join("type"))?.unwrap_or_default();
        let soft = read_attribute(&path.join("soft"))?;
        let hard = read_attribute(&path.join("hard"))?;
        let blocked = soft.as_deref() == Some("1") || hard.as_deref() == Some("1");
        radios.push(Radio { kind, blocked });
    }
    Ok(radios)
}

impl InfoProvider for DeviceModeProvider {
    fn fetch(&self) -> Result<Value, ProviderError> {
        let radios = radios(&self.root)?;
        let airplane = !radios.is_empty() && radios.iter().all(|r| r.blocked);
        let enabled = |kind: &str| radios.iter().any(|r| r.kind == kind && !r.blocked);

        let supplies = power_supplies(&self.root)?;
        let mut on_mains = false;
        for supply in supplies.iter().filter(|s| s.kind == "Mains") {
            on_mains |= supply.online()?;
        }
        let power_source = if on_mains {
            "ac"
        } else if supplies.iter().any(|s| s.kind == "Battery") {
            "battery"
        } else {
            "unknown"
        };

        Ok([
            ("airplane_mode", airplane.to_string()),
            ("wifi_enabled", enabled("wlan").to_string()),
            ("bluetooth_enabled", enabled("bluetooth").to_string()),
            ("power_source", power_source.to_string()),
        ]
        .into_iter()
        .collect())
    }
}
