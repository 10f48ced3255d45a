//! Per-module configuration loading
//!
//! Modules read their settings from a TOML file living in the shared config
//! directory (see `DynamicModule::config_file`). The file is optional: a
//! missing file means defaults. Values are flattened into a string map so
//! module code stays decoupled from the TOML value model: nested tables
//! become dot-notation keys, arrays are comma-joined.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

/// Loads one module's configuration file into a flat key/value map.
///
/// A missing file yields an empty map. Files that fail to parse as TOML are
/// retried as plain `key=value` lines (`#` starts a comment), so hand-written
/// minimal configs keep working.
pub fn load_module_config(config_path: impl AsRef<Path>) -> Result<HashMap<String, String>> {
    let config_path = config_path.as_ref();
    if !config_path.exists() {
        debug!(
            "No config file at {}, using defaults",
            config_path.display()
        );
        return Ok(HashMap::new());
    }

    let contents = std::fs::read_to_string(config_path).map_err(|e| {
        Error::io(
            format!("reading module config {}", config_path.display()),
            e,
        )
    })?;

    if let Ok(parsed) = toml::from_str::<HashMap<String, toml::Value>>(&contents) {
        let mut config = HashMap::new();
        for (key, value) in parsed {
            flatten_toml_value(key, &value, &mut config);
        }
        return Ok(config);
    }

    // Not valid TOML: fall back to simple key=value lines.
    let mut config = HashMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            config.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    Ok(config)
}

/// Flattens one TOML value into the string map under `prefix`.
fn flatten_toml_value(prefix: String, value: &toml::Value, result: &mut HashMap<String, String>) {
    use toml::Value;

    match value {
        Value::String(s) => {
            result.insert(prefix, s.clone());
        }
        Value::Integer(i) => {
            result.insert(prefix, i.to_string());
        }
        Value::Float(f) => {
            result.insert(prefix, f.to_string());
        }
        Value::Boolean(b) => {
            result.insert(prefix, b.to_string());
        }
        Value::Array(arr) => {
            let values: Vec<String> = arr
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    _ => v.to_string(),
                })
                .collect();
            result.insert(prefix, values.join(","));
        }
        Value::Table(table) => {
            for (key, val) in table {
                let nested = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_toml_value(nested, val, result);
            }
        }
        Value::Datetime(dt) => {
            result.insert(prefix, dt.to_string());
        }
    }
}
