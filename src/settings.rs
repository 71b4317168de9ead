use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use crate::category::README_FILENAME;

pub const SETTINGS_FILE_NAME: &str = ".clipsum_settings.json";

/// Persisted user preferences: the two output toggles and the
/// extension allow-list. Everything else is per-session state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Wrap each file in structured `<file_info>`/`<content>` blocks
    /// instead of a plain comment header.
    #[serde(default = "default_true")]
    pub xml_format: bool,

    /// Include the absolute file path in each header.
    #[serde(default = "default_true")]
    pub filepath: bool,

    /// Accepted file types: lower-cased extensions with a leading dot,
    /// plus the literal readme filename token.
    #[serde(default = "default_file_types")]
    pub allowed_file_types: BTreeSet<String>,
}

fn default_true() -> bool {
    true
}

/// Built-in allow-list used when no settings file exists.
pub fn default_file_types() -> BTreeSet<String> {
    [".py", ".ts", ".tsx", ".css", README_FILENAME]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            xml_format: true,
            filepath: true,
            allowed_file_types: default_file_types(),
        }
    }
}

impl Settings {
    /// Per-user settings location: a dot-file in the home directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(SETTINGS_FILE_NAME))
    }

    /// Load settings from `path`. Never fails: a missing, unreadable or
    /// malformed file yields the defaults and a log entry.
    pub fn load_from(path: &PathBuf) -> Settings {
        match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<Settings>(&raw) {
                Ok(settings) => {
                    log::info!("Settings loaded from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::error!("Malformed settings file {}: {e}", path.display());
                    Settings::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Settings::default(),
            Err(e) => {
                log::error!("Error reading settings file {}: {e}", path.display());
                Settings::default()
            }
        }
    }

    /// Load from the default per-user location.
    pub fn load() -> Settings {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::error!("Could not determine home directory; using default settings");
                Settings::default()
            }
        }
    }

    /// Write settings to `path`. Best-effort: failures are logged and
    /// swallowed, never raised to the caller.
    pub fn save_to(&self, path: &PathBuf) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, json) {
                    log::error!("Error saving settings to {}: {e}", path.display());
                } else {
                    log::info!("Settings saved to {}", path.display());
                }
            }
            Err(e) => log::error!("Error serializing settings: {e}"),
        }
    }

    /// Save to the default per-user location.
    pub fn save(&self) {
        if let Some(path) = Self::default_path() {
            self.save_to(&path);
        } else {
            log::error!("Could not determine home directory; settings not saved");
        }
    }
}
