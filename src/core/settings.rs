// src/core/settings.rs

//! Scalar settings persisted as one small text file per key.
//!
//! Keys are relative, optionally namespaced paths (`theme/dark_mode`) under the
//! settings root. The filesystem is the only source of truth: nothing is held in
//! memory between calls. Writes go through a temp file in the target's directory
//! which is synced, renamed over the target, and followed by a sync of the
//! directory itself, so readers never observe a partial value.

use crate::constants::BOOL_INT_FALLBACK_MAX_LEN;
use crate::core::paths::DirectoryResolver;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, ErrorKind, Write};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

const TRUE_WORDS: [&str; 4] = ["true", "yes", "on", "1"];
const FALSE_WORDS: [&str; 5] = ["false", "no", "off", "0", ""];

/// Why a key was rejected or a write did not complete.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The key is the empty string.
    #[error("Settings key is empty.")]
    EmptyKey,
    /// The key contains a NUL byte, which no path can hold.
    #[error("Settings key contains a NUL byte.")]
    NulByte,
    /// The key resolves to the root itself or to a path outside it.
    #[error("Settings key '{key}' resolves outside the settings root.")]
    EscapesRoot {
        /// The rejected key.
        key: String,
    },
    /// Canonicalizing the key's path failed.
    #[error("Could not resolve settings key '{key}': {source}")]
    Resolve {
        /// The key being resolved.
        key: String,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },
    /// The target path has no parent directory to hold the temp file.
    #[error("Settings path '{0}' has no parent directory.")]
    NoParent(PathBuf),
    /// Creating, writing or syncing a file or directory failed.
    #[error("Filesystem Error: {0}")]
    Io(#[from] io::Error),
    /// Renaming the temp file over the target failed.
    #[error("Could not move temporary file into place: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// The decoding type of a setting, chosen explicitly at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    /// `true`/`false`, read forgivingly.
    Bool,
    /// A signed 64-bit integer.
    Int,
    /// A 64-bit float.
    Float,
    /// Raw text, stored as given.
    Str,
}

impl FromStr for SettingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Ok(Self::Bool),
            "int" | "integer" => Ok(Self::Int),
            "float" | "double" => Ok(Self::Float),
            "str" | "string" => Ok(Self::Str),
            other => Err(format!("unknown setting kind '{other}'")),
        }
    }
}

/// A scalar setting value.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A float.
    Float(f64),
    /// A string.
    Str(String),
}

impl SettingValue {
    /// The kind this value decodes as.
    pub fn kind(&self) -> SettingKind {
        match self {
            Self::Bool(_) => SettingKind::Bool,
            Self::Int(_) => SettingKind::Int,
            Self::Float(_) => SettingKind::Float,
            Self::Str(_) => SettingKind::Str,
        }
    }

    /// Renders the value in its on-disk text form. With `as_int`, booleans are
    /// written as `1`/`0` instead of `True`/`False`.
    pub fn encode(&self, as_int: bool) -> String {
        match self {
            Self::Bool(b) if as_int => String::from(if *b { "1" } else { "0" }),
            Self::Bool(b) => String::from(if *b { "True" } else { "False" }),
            Self::Int(i) => i.to_string(),
            // Debug keeps the fractional part on whole numbers ("1.0").
            Self::Float(f) => format!("{f:?}"),
            Self::Str(s) => s.clone(),
        }
    }

    /// Decodes already-trimmed file content as `kind`. Booleans never fail to
    /// decode; numbers return `None` on a parse error.
    pub fn decode(kind: SettingKind, raw: &str, is_inversed: bool) -> Option<Self> {
        match kind {
            SettingKind::Bool => Some(Self::Bool(parse_bool(raw) ^ is_inversed)),
            SettingKind::Int => raw.parse().ok().map(Self::Int),
            SettingKind::Float => raw.parse().ok().map(Self::Float),
            SettingKind::Str => Some(Self::Str(raw.to_string())),
        }
    }

    /// Parses user input as `kind`. Unlike [`SettingValue::decode`], booleans
    /// must be one of the recognized words.
    pub fn parse(kind: SettingKind, input: &str) -> Option<Self> {
        let trimmed = input.trim();
        match kind {
            SettingKind::Bool => {
                let lowered = trimmed.to_lowercase();
                if TRUE_WORDS.contains(&lowered.as_str()) {
                    Some(Self::Bool(true))
                } else if FALSE_WORDS.contains(&lowered.as_str()) {
                    Some(Self::Bool(false))
                } else {
                    None
                }
            }
            SettingKind::Str => Some(Self::Str(input.to_string())),
            _ => Self::decode(kind, trimmed, false),
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

/// Parses a boolean the forgiving way: known words first, then any short
/// string that parses as a nonzero integer, otherwise `false`.
pub fn parse_bool(raw: &str) -> bool {
    let lowered = raw.trim().to_lowercase();
    if TRUE_WORDS.contains(&lowered.as_str()) {
        return true;
    }
    if FALSE_WORDS.contains(&lowered.as_str()) {
        return false;
    }
    if raw.len() < BOOL_INT_FALLBACK_MAX_LEN {
        return raw.trim().parse::<i128>().is_ok_and(|n| n != 0);
    }
    false
}

/// A Rust type that can be stored as a setting.
pub trait Setting: Sized {
    /// The kind used to decode the stored text.
    const KIND: SettingKind;

    /// Extracts `Self` from a decoded value of the matching kind.
    fn from_value(value: SettingValue) -> Option<Self>;
    /// Wraps `self` for encoding.
    fn into_value(self) -> SettingValue;
}

macro_rules! impl_setting {
    ($ty:ty, $kind:ident) => {
        impl Setting for $ty {
            const KIND: SettingKind = SettingKind::$kind;

            fn from_value(value: SettingValue) -> Option<Self> {
                match value {
                    SettingValue::$kind(v) => Some(v),
                    _ => None,
                }
            }

            fn into_value(self) -> SettingValue {
                SettingValue::$kind(self)
            }
        }
    };
}

impl_setting!(bool, Bool);
impl_setting!(i64, Int);
impl_setting!(f64, Float);
impl_setting!(String, Str);

/// Flags accepted by [`SettingsStore::load`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Flip the result of a boolean load.
    pub is_inversed: bool,
}

/// Flags accepted by [`SettingsStore::save`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Write booleans as `1`/`0`.
    pub as_int: bool,
}

/// Persists settings under a lazily resolved root directory.
#[derive(Debug)]
pub struct SettingsStore {
    root: DirectoryResolver,
}

impl SettingsStore {
    /// Creates a store rooted at `root`. Nothing touches the disk until the
    /// first load or save.
    pub fn new(root: DirectoryResolver) -> Self {
        Self { root }
    }

    /// The resolved settings root.
    pub fn root(&self) -> PathBuf {
        self.root.get()
    }

    /// Maps `key` to its file, rejecting anything that is empty, contains a NUL
    /// byte, or does not resolve to a strict descendant of the settings root.
    /// Any resolution error is a rejection.
    pub fn validate_key(&self, key: &str) -> Result<PathBuf, SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::EmptyKey);
        }
        if key.contains('\0') {
            return Err(SettingsError::NulByte);
        }

        let root = self.root.get();
        let target = resolve_lenient(&root.join(key)).map_err(|source| SettingsError::Resolve {
            key: key.to_string(),
            source,
        })?;

        if target == root || !target.starts_with(&root) {
            return Err(SettingsError::EscapesRoot {
                key: key.to_string(),
            });
        }
        Ok(target)
    }

    /// Saves a typed setting. See [`SettingsStore::save_value`].
    pub fn save<T: Setting>(&self, key: &str, value: T, options: SaveOptions) -> bool {
        self.save_value(key, &value.into_value(), options)
    }

    /// Durably writes `value` to the file for `key`. Returns `false` (after
    /// logging) if the key is rejected or any step of the write fails.
    pub fn save_value(&self, key: &str, value: &SettingValue, options: SaveOptions) -> bool {
        let target = match self.validate_key(key) {
            Ok(target) => target,
            Err(e) => {
                log::warn!("Invalid settings key {key:?}: {e}");
                return false;
            }
        };

        let content = value.encode(options.as_int);
        match write_atomic(&target, &content) {
            Ok(()) => {
                log::debug!("Saved setting '{}' = {:?}", key, content);
                true
            }
            Err(e) => {
                log::error!("Save failed for '{key}': {e}");
                false
            }
        }
    }

    /// Loads a typed setting, returning `default` if the key is rejected, the
    /// file is missing or unreadable, or its content does not parse.
    pub fn load<T: Setting>(&self, key: &str, default: T, options: LoadOptions) -> T {
        self.load_kind(key, T::KIND, options)
            .and_then(T::from_value)
            .unwrap_or(default)
    }

    /// Loads the setting for `key` decoded as `kind`, or `None` if there is no
    /// usable value.
    pub fn load_kind(
        &self,
        key: &str,
        kind: SettingKind,
        options: LoadOptions,
    ) -> Option<SettingValue> {
        let raw = match self.read_raw(key) {
            Ok(raw) => raw,
            Err(SettingsError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                log::debug!("Setting '{key}' not found, using default");
                return None;
            }
            Err(e) => {
                log::warn!("Could not load setting {key:?}: {e}");
                return None;
            }
        };

        let value = SettingValue::decode(kind, &raw, options.is_inversed);
        if value.is_none() {
            log::warn!("Setting '{key}' holds {raw:?}, which is not a valid {kind:?}");
        }
        value
    }

    fn read_raw(&self, key: &str) -> Result<String, SettingsError> {
        let target = self.validate_key(key)?;
        Ok(fs::read_to_string(target)?.trim().to_string())
    }
}

/// Canonicalizes the longest existing prefix of `path` and appends the rest
/// lexically, so paths that do not exist yet can still be checked.
fn resolve_lenient(path: &Path) -> io::Result<PathBuf> {
    let mut existing = path;
    let mut remainder: Vec<Component<'_>> = Vec::new();

    let canonical = loop {
        match dunce::canonicalize(existing) {
            Ok(canonical) => break canonical,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                match (existing.parent(), existing.components().next_back()) {
                    (Some(parent), Some(last)) => {
                        remainder.push(last);
                        existing = parent;
                    }
                    _ => return Err(e),
                }
            }
            Err(e) => return Err(e),
        }
    };

    let mut resolved = canonical;
    for component in remainder.into_iter().rev() {
        match component {
            Component::ParentDir => {
                resolved.pop();
            }
            Component::CurDir => {}
            other => resolved.push(other.as_os_str()),
        }
    }
    Ok(resolved)
}

fn write_atomic(target: &Path, content: &str) -> Result<(), SettingsError> {
    let parent = target
        .parent()
        .ok_or_else(|| SettingsError::NoParent(target.to_path_buf()))?;
    fs::create_dir_all(parent)?;

    let file_name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    // Same directory as the target so the rename never crosses filesystems.
    // The temp file deletes itself if any step below fails.
    let mut temp = tempfile::Builder::new()
        .prefix(&format!(".{file_name}."))
        .suffix(".tmp")
        .tempfile_in(parent)?;
    temp.write_all(content.as_bytes())?;
    temp.flush()?;
    temp.as_file().sync_all()?;
    temp.persist(target)?;

    // Success only once the rename itself is durable.
    sync_directory(parent)?;
    Ok(())
}

#[cfg(unix)]
fn sync_directory(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_directory(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{TempDir, tempdir};

    fn store() -> (TempDir, SettingsStore) {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(DirectoryResolver::new(dir.path().join("settings")));
        (dir, store)
    }

    fn leftover_temp_files(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "tmp"))
            .collect()
    }

    // --- `validate_key` Tests ---
    #[test]
    fn test_validate_accepts_plain_and_namespaced_keys() {
        let (_dir, store) = store();
        let root = store.root();

        assert_eq!(store.validate_key("volume").unwrap(), root.join("volume"));
        assert_eq!(
            store.validate_key("theme/dark_mode").unwrap(),
            root.join("theme").join("dark_mode")
        );
        assert_eq!(
            store.validate_key("theme/../volume").unwrap(),
            root.join("volume")
        );
    }

    #[test]
    fn test_validate_rejects_traversal() {
        let (_dir, store) = store();
        assert!(matches!(
            store.validate_key("../../etc/passwd"),
            Err(SettingsError::EscapesRoot { .. })
        ));
        assert!(store.validate_key("ns/../../outside").is_err());
        assert!(store.validate_key("/etc/passwd").is_err());
    }

    #[test]
    fn test_validate_rejects_empty_nul_and_root() {
        let (_dir, store) = store();
        assert!(matches!(store.validate_key(""), Err(SettingsError::EmptyKey)));
        assert!(matches!(
            store.validate_key("bad\0key"),
            Err(SettingsError::NulByte)
        ));
        assert!(store.validate_key(".").is_err());
        assert!(store.validate_key("ns/..").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_rejects_symlink_escape() {
        let (dir, store) = store();
        let outside = dir.path().join("outside");
        fs::create_dir_all(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, store.root().join("link")).unwrap();

        assert!(matches!(
            store.validate_key("link/secret"),
            Err(SettingsError::EscapesRoot { .. })
        ));
    }

    // --- save/load round trips ---
    #[test]
    fn test_save_then_load_each_kind() {
        let (_dir, store) = store();

        assert!(store.save("a/flag", true, SaveOptions::default()));
        assert!(store.load("a/flag", false, LoadOptions::default()));

        assert!(store.save("count", -42_i64, SaveOptions::default()));
        assert_eq!(store.load("count", 0_i64, LoadOptions::default()), -42);

        assert!(store.save("ratio", 0.75_f64, SaveOptions::default()));
        assert_eq!(store.load("ratio", 0.0_f64, LoadOptions::default()), 0.75);

        assert!(store.save("name", "Adwaita Dark".to_string(), SaveOptions::default()));
        assert_eq!(
            store.load("name", String::new(), LoadOptions::default()),
            "Adwaita Dark"
        );
    }

    #[test]
    fn test_as_int_and_inversed_flags() {
        let (_dir, store) = store();
        let root = store.root();

        assert!(store.save("vpn/autoconnect", true, SaveOptions { as_int: true }));
        assert_eq!(
            fs::read_to_string(root.join("vpn").join("autoconnect")).unwrap(),
            "1"
        );
        assert!(store.load("vpn/autoconnect", false, LoadOptions::default()));
        assert!(!store.load("vpn/autoconnect", false, LoadOptions { is_inversed: true }));
    }

    #[test]
    fn test_word_form_encoding() {
        let (_dir, store) = store();
        assert!(store.save("night_light", false, SaveOptions::default()));
        assert_eq!(
            fs::read_to_string(store.root().join("night_light")).unwrap(),
            "False"
        );
        assert!(store.save("scale", 2.0_f64, SaveOptions::default()));
        assert_eq!(fs::read_to_string(store.root().join("scale")).unwrap(), "2.0");
    }

    #[test]
    fn test_load_returns_default_on_missing_or_malformed() {
        let (_dir, store) = store();
        let root = store.root();

        assert_eq!(store.load("missing", 7_i64, LoadOptions::default()), 7);

        fs::write(root.join("broken"), "not a number\n").unwrap();
        assert_eq!(store.load("broken", 7_i64, LoadOptions::default()), 7);
        assert_eq!(store.load("broken", 1.5_f64, LoadOptions::default()), 1.5);
        assert_eq!(
            store.load("broken", String::new(), LoadOptions::default()),
            "not a number"
        );

        assert_eq!(store.load("../../etc/passwd", 3_i64, LoadOptions::default()), 3);
    }

    #[test]
    fn test_load_trims_whitespace() {
        let (_dir, store) = store();
        fs::write(store.root().join("brightness"), "  80 \n").unwrap();
        assert_eq!(store.load("brightness", 0_i64, LoadOptions::default()), 80);
    }

    #[test]
    fn test_save_rejects_escaping_key() {
        let (dir, store) = store();
        assert!(!store.save("../escaped", true, SaveOptions::default()));
        assert!(!dir.path().join("escaped").exists());
    }

    #[test]
    fn test_save_overwrites_and_leaves_no_temp_files() {
        let (_dir, store) = store();
        assert!(store.save("theme/accent", "blue".to_string(), SaveOptions::default()));
        assert!(store.save("theme/accent", "red".to_string(), SaveOptions::default()));

        let theme_dir = store.root().join("theme");
        assert_eq!(fs::read_to_string(theme_dir.join("accent")).unwrap(), "red");
        assert!(leftover_temp_files(&theme_dir).is_empty());
    }

    #[test]
    fn test_failed_save_reports_false_and_cleans_up() {
        let (_dir, store) = store();
        let root = store.root();
        // A directory occupying the target path makes the rename fail.
        fs::create_dir_all(root.join("occupied").join("child")).unwrap();

        assert!(!store.save("occupied", 1_i64, SaveOptions::default()));
        assert!(leftover_temp_files(&root).is_empty());
    }

    // --- Boolean parsing ---
    #[test]
    fn test_parse_bool_rules() {
        for word in ["true", "YES", "On", "1", " true "] {
            assert!(parse_bool(word), "{word:?} should be true");
        }
        for word in ["false", "No", "OFF", "0", ""] {
            assert!(!parse_bool(word), "{word:?} should be false");
        }
        assert!(parse_bool("5"));
        assert!(parse_bool("-3"));
        assert!(!parse_bool("00"));
        assert!(!parse_bool("maybe"));
        // Too wide for i64 but still short enough to count as an integer.
        assert!(parse_bool("9999999999999999999"));
        assert!(!parse_bool("0000000000000000000"));
        assert!(!parse_bool("100000000000000000000000"));
    }

    #[test]
    fn test_strict_parse_for_user_input() {
        assert_eq!(
            SettingValue::parse(SettingKind::Bool, "Yes"),
            Some(SettingValue::Bool(true))
        );
        assert_eq!(SettingValue::parse(SettingKind::Bool, "maybe"), None);
        assert_eq!(
            SettingValue::parse(SettingKind::Int, " 12 "),
            Some(SettingValue::Int(12))
        );
        assert_eq!(SettingValue::parse(SettingKind::Float, "x"), None);
        assert_eq!("integer".parse::<SettingKind>(), Ok(SettingKind::Int));
        assert!("tuple".parse::<SettingKind>().is_err());
    }
}
