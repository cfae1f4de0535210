//! Installed applications from XDG desktop entries.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::provider::{InfoProvider, ProviderError, Value};

const DESKTOP_EXTENSION: &str = "desktop";

/// System-managed locations of user-installed (non-distribution) apps.
const SYSTEM_APP_DIRS: [&str; 2] = [
    "var/lib/flatpak/exports/share/applications",
    "var/lib/snapd/desktop/applications",
];

/// Non-system installed applications.
///
/// Lists `.desktop` entries found in the configured directories and returns
/// their ids (file stems), sorted and deduplicated. Entries marked
/// `Hidden=true` or `NoDisplay=true` are skipped. Directories that do not
/// exist are ignored.
#[derive(Debug, Clone)]
pub struct InstalledAppsProvider {
    dirs: Vec<PathBuf>,
}

impl InstalledAppsProvider {
    /// Creates a provider scanning `dirs`.
    #[must_use]
    pub const fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Default directories: the user's local applications plus
    /// Flatpak and Snap exports under `root`.
    #[must_use]
    pub fn default_dirs(root: &Path) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = dirs::data_local_dir()
            .map(|d| d.join("applications"))
            .into_iter()
            .collect();
        dirs.extend(SYSTEM_APP_DIRS.iter().map(|d| root.join(d)));
        dirs
    }
}

/// Returns false for entries marked hidden. Non-UTF-8 bytes are decoded lossily.
fn is_listed(path: &Path) -> io::Result<bool> {
    let bytes = fs::read(path)?;
    Ok(!String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::trim)
        .any(|line| line == "Hidden=true" || line == "NoDisplay=true"))
}

/// Collects listed entry ids from `dir`.
///
/// Only failing to open the directory is an error; unreadable entries are
/// logged and skipped.
fn scan(dir: &Path, ids: &mut BTreeSet<String>) -> Result<(), ProviderError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(ProviderError::read(dir, e)),
    };

    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };
        if path.extension().and_then(|e| e.to_str()) != Some(DESKTOP_EXTENSION) {
            continue;
        }
        let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        match is_listed(&path) {
            Ok(true) => {
                ids.insert(id.to_string());
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable application entry");
            }
        }
    }
    Ok(())
}

impl InfoProvider for InstalledAppsProvider {
    fn fetch(&self) -> Result<Value, ProviderError> {
        let mut ids = BTreeSet::new();
        for dir in &self.dirs {
            scan(dir, &mut ids)?;
        }
        tracing::debug!(count = ids.len(), "Scanned application entries");
        Ok(Value::List(ids.into_iter().collect()))
    }
}
