// src/constants.rs

/// Sentinel returned for any system fact that cannot be determined.
pub const LABEL_NA: &str = "N/A";

/// Directory name of the cache root (inside `$XDG_CACHE_HOME`).
pub const CACHE_DIR_NAME: &str = "duskycc";

/// Directory name of the application config (inside `$XDG_CONFIG_HOME`).
pub const CONFIG_DIR_NAME: &str = "dusky";

/// Directory name of the settings root (inside the application config dir).
pub const SETTINGS_DIR_NAME: &str = "settings";

/// The name of the launcher configuration file (inside the application config dir).
pub const LAUNCHER_CONFIG_FILENAME: &str = "launcher.toml";

/// Probe file used to check that the settings root is writable.
pub const WRITE_TEST_FILENAME: &str = ".write_test";

/// Characters that route a command through `sh -c` instead of direct exec.
pub const SHELL_METACHARACTERS: &str = "|&;()<>$`\\\"'*?[]#~=!{}%";

/// Upper bound on the length of a string considered for integer fallback
/// when parsing a boolean setting.
pub const BOOL_INT_FALLBACK_MAX_LEN: usize = 20;
