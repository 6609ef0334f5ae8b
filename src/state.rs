// src/state.rs

use crate::core::paths::{AppPaths, DirectoryResolver};
use crate::core::settings::{LoadOptions, SaveOptions, Setting, SettingsStore};
use crate::core::system_info::SystemInfo;
use crate::models::LauncherConfig;
use crate::system::executor::CommandLauncher;
use crate::system::launcher_config;
use std::path::PathBuf;

/// The services shared by every consumer of this crate.
///
/// Build one at startup and pass it by reference; it lives for the whole
/// process. Everything inside is thread-safe, so a shared reference can be
/// used from any thread.
#[derive(Debug)]
pub struct AppContext {
    paths: AppPaths,
    cache_dir: DirectoryResolver,
    settings: SettingsStore,
    system_info: SystemInfo,
    launcher: CommandLauncher,
}

impl AppContext {
    /// Builds the context from the XDG environment and `launcher.toml`.
    pub fn from_env() -> Self {
        let paths = AppPaths::from_env();
        let launcher_config = launcher_config::load_launcher_config(&paths.launcher_config_file);
        Self::new(paths, launcher_config)
    }

    pub fn new(paths: AppPaths, launcher_config: LauncherConfig) -> Self {
        Self::with_system_info(paths, launcher_config, SystemInfo::default())
    }

    pub fn with_system_info(
        paths: AppPaths,
        launcher_config: LauncherConfig,
        system_info: SystemInfo,
    ) -> Self {
        Self {
            cache_dir: DirectoryResolver::new(&paths.cache_dir),
            settings: SettingsStore::new(DirectoryResolver::new(&paths.settings_dir)),
            system_info,
            launcher: CommandLauncher::new(launcher_config),
            paths,
        }
    }

    pub fn paths(&self) -> &AppPaths {
        &self.paths
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn system_info(&self) -> &SystemInfo {
        &self.system_info
    }

    pub fn launcher(&self) -> &CommandLauncher {
        &self.launcher
    }

    /// The resolved cache root, created on first use.
    pub fn get_cache_dir(&self) -> PathBuf {
        self.cache_dir.get()
    }

    /// A cached system fact, or `"N/A"`.
    pub fn get_system_value(&self, key: &str) -> String {
        self.system_info.get(key)
    }

    pub fn load_setting<T: Setting>(&self, key: &str, default: T, is_inversed: bool) -> T {
        self.settings.load(key, default, LoadOptions { is_inversed })
    }

    pub fn save_setting<T: Setting>(&self, key: &str, value: T, as_int: bool) -> bool {
        self.settings.save(key, value, SaveOptions { as_int })
    }

    pub fn execute_command(&self, command: &str, title: &str, run_in_terminal: bool) -> bool {
        self.launcher.execute(command, title, run_in_terminal)
    }
}
