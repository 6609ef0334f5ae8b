// src/core/paths.rs

use crate::constants::{
    CACHE_DIR_NAME, CONFIG_DIR_NAME, LAUNCHER_CONFIG_FILENAME, SETTINGS_DIR_NAME,
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};

/// A directory that is created and canonicalized lazily, at most once per
/// process.
///
/// The first successful [`DirectoryResolver::get`] publishes the canonical
/// path through a `OnceLock`, so every later call is a lock-free read. If the
/// directory cannot be created or canonicalized, the unresolved base path is
/// returned instead and resolution is retried on the next call.
#[derive(Debug)]
pub struct DirectoryResolver {
    base_path: PathBuf,
    resolved: OnceLock<PathBuf>,
    creation_lock: Mutex<()>,
}

impl DirectoryResolver {
    /// Creates a resolver for `base_path`. Nothing touches the filesystem yet.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            resolved: OnceLock::new(),
            creation_lock: Mutex::new(()),
        }
    }

    /// The configured, unresolved base path.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Returns the canonical directory path, creating the directory tree on
    /// first use. Never fails: on any OS error the unresolved base path is
    /// returned, which may not exist or be writable.
    pub fn get(&self) -> PathBuf {
        if let Some(path) = self.resolved.get() {
            return path.clone();
        }

        let _guard = self
            .creation_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Another thread may have won the race while we waited for the lock.
        if let Some(path) = self.resolved.get() {
            return path.clone();
        }

        match create_and_canonicalize(&self.base_path) {
            Ok(canonical) => {
                log::debug!(
                    "Resolved directory '{}' -> '{}'",
                    self.base_path.display(),
                    canonical.display()
                );
                self.resolved.get_or_init(|| canonical).clone()
            }
            Err(e) => {
                log::error!(
                    "Failed to resolve directory '{}': {}",
                    self.base_path.display(),
                    e
                );
                self.base_path.clone()
            }
        }
    }

    /// Returns the published canonical path without attempting resolution.
    pub fn resolved(&self) -> Option<&Path> {
        self.resolved.get().map(PathBuf::as_path)
    }
}

fn create_and_canonicalize(path: &Path) -> std::io::Result<PathBuf> {
    fs::create_dir_all(path)?;
    dunce::canonicalize(path)
}

/// The directory layout used by the application, resolved from the XDG base
/// directories with home-relative fallbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// Root of the cache (`$XDG_CACHE_HOME/duskycc`).
    pub cache_dir: PathBuf,
    /// Root of the per-key settings files (`$XDG_CONFIG_HOME/dusky/settings`).
    pub settings_dir: PathBuf,
    /// Full path to `launcher.toml`.
    pub launcher_config_file: PathBuf,
}

impl AppPaths {
    /// Resolves all paths from the process environment.
    pub fn from_env() -> Self {
        let cache_home = xdg_base_dir("XDG_CACHE_HOME", ".cache");
        let config_home = xdg_base_dir("XDG_CONFIG_HOME", ".config");
        Self::with_bases(&cache_home, &config_home)
    }

    /// Builds the layout under explicit cache and config base directories.
    pub fn with_bases(cache_home: &Path, config_home: &Path) -> Self {
        let app_config = config_home.join(CONFIG_DIR_NAME);
        Self {
            cache_dir: cache_home.join(CACHE_DIR_NAME),
            settings_dir: app_config.join(SETTINGS_DIR_NAME),
            launcher_config_file: app_config.join(LAUNCHER_CONFIG_FILENAME),
        }
    }
}

/// Resolves an XDG base directory. The variable is honored only when it is
/// non-empty and absolute, otherwise `~/<default_suffix>` is used.
pub fn xdg_base_dir(env_var: &str, default_suffix: &str) -> PathBuf {
    xdg_base_from_value(env::var(env_var).ok().as_deref(), home_dir(), default_suffix)
}

fn xdg_base_from_value(value: Option<&str>, home: PathBuf, default_suffix: &str) -> PathBuf {
    if let Some(candidate) = value.map(str::trim).filter(|v| !v.is_empty()) {
        let candidate = PathBuf::from(candidate);
        if candidate.is_absolute() {
            return candidate;
        }
        log::debug!(
            "Ignoring relative XDG path '{}', falling back to home",
            candidate.display()
        );
    }
    home.join(default_suffix)
}

/// The user's home directory, or the current directory if it cannot be found.
pub fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}
