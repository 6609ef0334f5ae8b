// src/models.rs

use serde::{Deserialize, Serialize};

/// How user-configured actions are turned into a process invocation.
///
/// Loaded from `launcher.toml`; every field falls back to its default when
/// omitted, so a partial file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Session launcher front-end prepended to every invocation.
    pub launcher: Vec<String>,
    /// Shell used for commands that need shell parsing.
    pub shell: String,
    /// Flag that makes `shell` run its next argument as a command string.
    pub shell_command_flag: String,
    pub terminal: TerminalConfig,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            launcher: vec!["uwsm-app".to_string(), "--".to_string()],
            shell: "sh".to_string(),
            shell_command_flag: "-c".to_string(),
            terminal: TerminalConfig::default(),
        }
    }
}

impl LauncherConfig {
    /// The launcher front-end binary, which must be on `PATH`.
    pub fn launcher_program(&self) -> Option<&str> {
        self.launcher.first().map(String::as_str)
    }
}

/// The terminal used for actions that run in a visible window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub program: String,
    pub class_flag: String,
    /// Window class used by the compositor to match terminal actions.
    pub class: String,
    pub title_flag: String,
    /// Keeps the window open after the command exits.
    pub hold_flag: String,
    /// Title used when the configured one is empty after sanitizing.
    pub fallback_title: String,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            program: "kitty".to_string(),
            class_flag: "--class".to_string(),
            class: "dusky-term".to_string(),
            title_flag: "--title".to_string(),
            hold_flag: "--hold".to_string(),
            fallback_title: "Dusky Terminal".to_string(),
        }
    }
}
