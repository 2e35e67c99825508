use std::fs;
use std::path::{Path, PathBuf};

use engine_logging::{engine_error, engine_info, engine_warn};
use follow_engine::AtomicFileWriter;
use serde::{Deserialize, Serialize};

const SETTINGS_FILENAME: &str = ".followings_exporter.ron";

/// Choices remembered between invocations. The target account is not kept;
/// every run without `--target` exports the logged-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub(crate) struct PersistedSettings {
    pub cookies_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub verified_only: bool,
    pub private_only: bool,
    pub fetch_details: bool,
    pub embed_thumbnails: bool,
}

pub(crate) fn load_settings(dir: &Path) -> PersistedSettings {
    let path = dir.join(SETTINGS_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return PersistedSettings::default();
        }
        Err(err) => {
            engine_warn!("Failed to read settings from {:?}: {}", path, err);
            return PersistedSettings::default();
        }
    };

    match ron::from_str(&content) {
        Ok(settings) => {
            engine_info!("Loaded settings from {:?}", path);
            settings
        }
        Err(err) => {
            engine_warn!("Failed to parse settings from {:?}: {}", path, err);
            PersistedSettings::default()
        }
    }
}

pub(crate) fn save_settings(dir: &Path, settings: &PersistedSettings) {
    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(settings, pretty) {
        Ok(text) => text,
        Err(err) => {
            engine_error!("Failed to serialize settings: {}", err);
            return;
        }
    };

    let writer = AtomicFileWriter::new(dir.to_path_buf());
    if let Err(err) = writer.write(SETTINGS_FILENAME, &content) {
        engine_error!("Failed to write settings to {:?}: {}", dir, err);
    }
}
