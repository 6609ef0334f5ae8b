//! # Config Loader
//!
//! Loads the declarative page configuration of the control center. The
//! content is a nested YAML mapping that this crate does not interpret; it is
//! handed to the presentation layer as-is. Every failure degrades to an empty
//! mapping so a broken file never prevents startup.
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

/// Reads `config_path` as a YAML mapping.
///
/// Returns an empty mapping if the file is unreadable, is not valid YAML, or
/// its top level is not a mapping.
pub fn load_config(config_path: &Path) -> Mapping {
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            log::warn!("Config file unreadable: '{}' ({})", config_path.display(), e);
            return Mapping::new();
        }
    };

    match serde_yaml::from_str::<Value>(&content) {
        Ok(Value::Mapping(mapping)) => mapping,
        Ok(other) => {
            log::warn!(
                "Config file '{}' is not a mapping (found {}), ignoring it",
                config_path.display(),
                value_kind(&other)
            );
            Mapping::new()
        }
        Err(e) => {
            log::error!("YAML syntax error in '{}': {}", config_path.display(), e);
            Mapping::new()
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
