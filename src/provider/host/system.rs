//! Providers backed by `sysinfo`.

use std::collections::BTreeMap;
use std::thread;

use sysinfo::System;

use crate::provider::{InfoProvider, ProviderError, Value};

const MIB: u64 = 1024 * 1024;

/// Formats memory totals (in bytes) as whole mebibytes.
#[must_use]
pub fn format_ram(total_bytes: u64, available_bytes: u64) -> String {
    format!(
        "Total RAM: {}MB, Available RAM: {}MB",
        total_bytes / MIB,
        available_bytes / MIB
    )
}

/// Total and available memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryProvider;

impl InfoProvider for MemoryProvider {
    fn fetch(&self) -> Result<Value, ProviderError> {
        let mut system = System::new();
        system.refresh_memory();

        let total = system.total_memory();
        if total == 0 {
            return Err(ProviderError::Unavailable {
                what: "memory information",
            });
        }

        Ok(Value::Text(format_ram(total, system.available_memory())))
    }
}

/// Operating system release metadata, encoded as a JSON object string.
///
/// Keys absent on the host are omitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionProvider;

/// Encodes release fields as a JSON object string.
///
/// # Errors
///
/// Returns [`ProviderError::Encode`] if serialization fails.
pub fn encode_version(fields: &BTreeMap<&str, String>) -> Result<String, ProviderError> {
    Ok(serde_json::to_string(fields)?)
}

impl InfoProvider for VersionProvider {
    fn fetch(&self) -> Result<Value, ProviderError> {
        let mut fields = BTreeMap::new();
        let optional = [
            ("OS_NAME", System::name()),
            ("OS_VERSION", System::os_version()),
            ("LONG_OS_VERSION", System::long_os_version()),
            ("KERNEL_VERSION", System::kernel_version()),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                fields.insert(key, value);
            }
        }
        fields.insert("DISTRIBUTION_ID", System::distribution_id());
        fields.insert("ARCH", std::env::consts::ARCH.to_string());

        Ok(Value::Text(encode_version(&fields)?))
    }
}

/// Host-level information: name, uptime, load and CPU count.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInfoProvider;

impl InfoProvider for SystemInfoProvider {
    fn fetch(&self) -> Result<Value, ProviderError> {
        let load = System::load_average();
        let cpus = thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);

        let mut fields = vec![
            ("os", std::env::consts::OS.to_string()),
            ("arch", std::env::consts::ARCH.to_string()),
            ("cpu_count", cpus.to_string()),
            ("uptime_secs", System::uptime().to_string()),
            ("boot_time", System::boot_time().to_string()),
            (
                "load_average",
                format!("{:.2} {:.2} {:.2}", load.one, load.five, load.fifteen),
            ),
        ];
        if let Some(host) = System::host_name() {
            fields.push(("host_name", host));
        }

        Ok(fields.into_iter().collect())
    }
}
