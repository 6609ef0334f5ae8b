// src/system/preflight.rs

use crate::constants::WRITE_TEST_FILENAME;
use crate::models::LauncherConfig;
use crate::system::launcher_config::is_executable_in_path;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// A condition that stops the application at startup.
#[derive(Error, Debug)]
pub enum PreflightError {
    /// Required programs not found on `PATH`.
    #[error("missing dependencies:\n{}", format_missing(.0))]
    MissingDependencies(Vec<String>),
}

fn format_missing(missing: &[String]) -> String {
    missing
        .iter()
        .map(|dep| format!("  - {dep}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Verifies that the external binaries this crate cannot work without are
/// installed. An unwritable settings root is only logged, since loads still
/// work and saves fail individually.
pub fn preflight_check(config: &LauncherConfig, settings_root: &Path) -> Result<(), PreflightError> {
    let missing = missing_dependencies(config, is_executable_in_path);

    if let Err(e) = check_writable(settings_root) {
        log::warn!(
            "Settings directory '{}' is not writable: {}",
            settings_root.display(),
            e
        );
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PreflightError::MissingDependencies(missing))
    }
}

fn missing_dependencies(config: &LauncherConfig, is_installed: impl Fn(&str) -> bool) -> Vec<String> {
    match config.launcher_program() {
        Some(program) if is_installed(program) => Vec::new(),
        Some(program) => vec![format!("{program} (session launcher front-end)")],
        None => vec!["a session launcher front-end (launcher is empty in launcher.toml)".to_string()],
    }
}

fn check_writable(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    let probe = dir.join(WRITE_TEST_FILENAME);
    fs::File::create(&probe)?;
    fs::remove_file(&probe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_installed_launcher_passes() {
        let config = LauncherConfig::default();
        assert!(missing_dependencies(&config, |p| p == "uwsm-app").is_empty());
    }

    #[test]
    fn test_missing_launcher_is_reported() {
        let config = LauncherConfig::default();
        let missing = missing_dependencies(&config, |_| false);
        assert_eq!(missing.len(), 1);
        assert!(missing[0].starts_with("uwsm-app"));

        let err = PreflightError::MissingDependencies(missing);
        assert!(err.to_string().contains("  - uwsm-app"));
    }

    #[test]
    fn test_empty_launcher_is_reported() {
        let mut config = LauncherConfig::default();
        config.launcher.clear();
        assert_eq!(missing_dependencies(&config, |_| true).len(), 1);
    }

    #[test]
    fn test_preflight_with_unknown_launcher_fails() {
        let dir = tempdir().unwrap();
        let mut config = LauncherConfig::default();
        config.launcher = vec!["definitely-not-a-real-binary-dusky".to_string()];

        let result = preflight_check(&config, &dir.path().join("settings"));
        assert!(matches!(result, Err(PreflightError::MissingDependencies(_))));
        // The writability probe ran and cleaned up after itself.
        assert!(dir.path().join("settings").is_dir());
        assert!(!dir.path().join("settings").join(WRITE_TEST_FILENAME).exists());
    }
}
