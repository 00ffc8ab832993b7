use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::default_paths::get_default_notes_path;
use crate::notes::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub notes_directory: PathBuf,
}

impl Settings {
    /// Settings pointing at the platform default notes directory.
    pub fn with_default_path(debug: bool) -> Result<Self> {
        let notes_directory = get_default_notes_path(debug).ok_or(Error::NoDefaultPath)?;
        Ok(Self { notes_directory })
    }
}

/// JSON settings file living outside the notes directory.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    default: Settings,
}

impl SettingsStore {
    /// A store whose missing or unreadable file falls back to `default`.
    pub fn new<P: AsRef<Path>>(path: P, default: Settings) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            default,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the settings, writing the default file first if there is none.
    ///
    /// A file that cannot be read or parsed is replaced with the default.
    pub fn load(&self) -> Result<Settings> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => match serde_json::from_str::<Settings>(&raw) {
                Ok(settings) => {
                    info!(
                        path = %self.path.display(),
                        notes_directory = %settings.notes_directory.display(),
                        "settings loaded"
                    );
                    return Ok(settings);
                }
                Err(err) => {
                    warn!(path = %self.path.display(), error = %err, "invalid settings file, resetting to defaults");
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "unreadable settings file, resetting to defaults");
            }
        }

        self.save(&self.default)?;
        info!(
            path = %self.path.display(),
            notes_directory = %self.default.notes_directory.display(),
            "created settings file with defaults"
        );
        Ok(self.default.clone())
    }

    /// Overwrites the settings file.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}
