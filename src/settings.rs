use crate::types::Settings;
use log::{info, warn};
use std::io;
use std::path::{Path, PathBuf};

/// Settings persisted as pretty JSON at a fixed path.
///
/// Loading never fails: a missing file yields defaults silently, a
/// malformed one yields defaults with a warning.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Settings {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No settings at {:?}, using defaults", self.path);
                return Settings::default();
            }
            Err(e) => {
                warn!("Failed to read settings {:?}: {}", self.path, e);
                return Settings::default();
            }
        };
        match serde_json::from_str::<Settings>(&data) {
            Ok(s) => {
                info!("Loaded settings from {:?}", self.path);
                s.sanitized()
            }
            Err(e) => {
                warn!("Failed to parse settings file {:?}: {}", self.path, e);
                Settings::default()
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> io::Result<()> {
        let json = serde_json::to_string_pretty(settings).map_err(io::Error::other)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, json)?;
        log::debug!("Settings saved to {:?}", self.path);
        Ok(())
    }
}
