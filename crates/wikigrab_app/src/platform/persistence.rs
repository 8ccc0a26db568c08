use std::fs;
use std::path::{Path, PathBuf};

use engine_logging::{engine_error, engine_info, engine_warn};
use serde::{Deserialize, Serialize};
use wikigrab_core::Settings;
use wikigrab_engine::AtomicFileWriter;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct SettingsFile {
    #[serde(rename = "Settings", default)]
    settings: PersistedSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct PersistedSettings {
    pukiwiki_url: String,
    save_path: String,
}

impl Default for PersistedSettings {
    fn default() -> Self {
        Settings::default().into()
    }
}

impl From<Settings> for PersistedSettings {
    fn from(settings: Settings) -> Self {
        Self {
            pukiwiki_url: settings.pukiwiki_url,
            save_path: settings.save_path,
        }
    }
}

impl From<PersistedSettings> for Settings {
    fn from(persisted: PersistedSettings) -> Self {
        Self {
            pukiwiki_url: persisted.pukiwiki_url,
            save_path: persisted.save_path,
        }
    }
}

/// Load settings, falling back to defaults for a missing or unreadable file
/// and for any missing key.
pub(crate) fn load_settings(path: &Path) -> Settings {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            engine_info!("No settings file at {:?}; using defaults", path);
            return Settings::default();
        }
        Err(err) => {
            engine_warn!("Failed to read settings from {:?}: {}", path, err);
            return Settings::default();
        }
    };

    match toml::from_str::<SettingsFile>(&content) {
        Ok(file) => {
            engine_info!("Loaded settings from {:?}", path);
            file.settings.into()
        }
        Err(err) => {
            engine_warn!("Failed to parse settings from {:?}: {}", path, err);
            Settings::default()
        }
    }
}

pub(crate) fn save_settings(path: &Path, settings: &Settings) {
    let file = SettingsFile {
        settings: settings.clone().into(),
    };
    let content = match toml::to_string_pretty(&file) {
        Ok(text) => text,
        Err(err) => {
            engine_error!("Failed to serialize settings: {}", err);
            return;
        }
    };

    let Some(filename) = path.file_name().and_then(|name| name.to_str()) else {
        engine_error!("Settings path {:?} has no file name", path);
        return;
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let writer = AtomicFileWriter::new(dir);
    match writer.write(filename, &content) {
        Ok(written) => engine_info!("Saved settings to {:?}", written),
        Err(err) => engine_error!("Failed to write settings to {:?}: {}", path, err),
    }
}
