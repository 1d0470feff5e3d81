//! Reading and writing the settings file
//!
//! The file is `config.json` under `dirs::config_dir()/panes`
//! (`%APPDATA%\panes` on Windows, `~/Library/Application Support/panes` on
//! macOS, `~/.config/panes` on Linux). A broken or missing file never stops
//! startup: it degrades to defaults with a warning.

use crate::config::Settings;
use crate::error::{Error, Result, ResultExt};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = "panes";
const CONFIG_FILE_NAME: &str = "config.json";
/// Written first, then renamed over the real file.
const CONFIG_BACKUP_NAME: &str = "config.json.bak";

pub fn get_config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().ok_or(Error::ConfigDirNotFound)?;
    Ok(base.join(CONFIG_DIR_NAME))
}

pub fn get_config_file_path() -> Result<PathBuf> {
    get_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

fn save_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |source| Error::ConfigSave {
        path: path.to_path_buf(),
        source: Box::new(source),
    }
}

/// Settings for this session. Never fails; see the module docs.
pub fn load_config() -> Settings {
    get_config_file_path()
        .and_then(|path| load_config_from(&path))
        .unwrap_or_warn_default(Settings::default(), "Failed to load configuration")
}

/// Read and sanitize one settings file. A missing or blank file is not an
/// error; it yields defaults.
pub fn load_config_from(config_path: &Path) -> Result<Settings> {
    let contents = match fs::read_to_string(config_path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No settings at {}, using defaults", config_path.display());
            return Ok(Settings::default());
        }
        Err(e) => {
            return Err(Error::ConfigLoad {
                path: config_path.to_path_buf(),
                source: Box::new(e),
            })
        }
    };

    if contents.trim().is_empty() {
        debug!("Settings file {} is blank", config_path.display());
        return Ok(Settings::default());
    }

    let settings = Settings::from_json_sanitized(&contents).map_err(|e| {
        warn!("Settings file {} is not valid JSON: {}", config_path.display(), e);
        Error::from(e)
    })?;

    info!("Loaded settings from {}", config_path.display());
    Ok(settings)
}

pub fn save_config(settings: &Settings) -> Result<()> {
    save_config_to(settings, &get_config_dir()?)
}

/// Write `settings` into `config_dir`, creating the directory if needed.
/// The JSON goes to a backup file that is then renamed over `config.json`,
/// so a crash mid-write leaves the previous file intact.
pub fn save_config_to(settings: &Settings, config_dir: &Path) -> Result<()> {
    let config_path = config_dir.join(CONFIG_FILE_NAME);
    let backup_path = config_dir.join(CONFIG_BACKUP_NAME);

    fs::create_dir_all(config_dir).map_err(save_error(config_dir))?;

    let json = serde_json::to_string_pretty(settings).map_err(|e| Error::ConfigSave {
        path: config_path.clone(),
        source: Box::new(e),
    })?;
    fs::write(&backup_path, json).map_err(save_error(&backup_path))?;
    fs::rename(&backup_path, &config_path).map_err(save_error(&config_path))?;

    debug!("Saved settings to {}", config_path.display());
    Ok(())
}

/// Save, logging instead of returning the error. `true` on success.
pub fn save_config_silent(settings: &Settings) -> bool {
    save_config(settings)
        .map_err(|e| warn!("Failed to save configuration: {}", e))
        .is_ok()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
