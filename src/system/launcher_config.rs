// src/system/launcher_config.rs

use std::{env, fs, io, path::Path};

use thiserror::Error;

use crate::models::LauncherConfig;

/// Errors raised while reading or creating `launcher.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading or writing the file failed.
    #[error("Filesystem Error: {0}")]
    Io(#[from] io::Error),
    /// The file is not valid TOML for [`LauncherConfig`].
    #[error("Failed to parse launcher.toml: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// The default configuration could not be rendered.
    #[error("Failed to serialize launcher config to TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Reads `launcher.toml`, writing the defaults there first if it does not
/// exist yet.
pub fn read_launcher_config(path: &Path) -> Result<LauncherConfig, ConfigError> {
    if !path.exists() {
        let default_config = LauncherConfig::default();
        let toml_string = toml::to_string_pretty(&default_config)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml_string)?;
        log::debug!("Wrote default launcher config to '{}'", path.display());
        Ok(default_config)
    } else {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

/// Like [`read_launcher_config`], but any failure degrades to the defaults.
pub fn load_launcher_config(path: &Path) -> LauncherConfig {
    read_launcher_config(path).unwrap_or_else(|e| {
        log::warn!(
            "Using default launcher config, '{}' is unusable: {}",
            path.display(),
            e
        );
        LauncherConfig::default()
    })
}

/// Returns `true` if `executable_name` is a file in any `PATH` directory.
pub fn is_executable_in_path(executable_name: &str) -> bool {
    if let Ok(path_var) = env::var("PATH") {
        for path in env::split_paths(&path_var) {
            if path.join(executable_name).is_file() {
                return true;
            }
        }
    }
    false
}
