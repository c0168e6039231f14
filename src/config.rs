use crate::error::{ConfigKind, InstallError};
use anyhow::{Context, Result};
use serde_yaml::{Mapping, Value};
use std::{
    fs,
    io::{self, Write},
    path::Path,
};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

pub const REVIEW_DIR: &str = ".review";
pub const CONFIG_FILE: &str = "config.yml";
pub const DEFAULT_LANG: &str = "en";
const LANG_KEY: &str = "lang";

/// Reads a YAML mapping. A missing, blank or `null` document is an empty map.
pub fn load_config(path: &Path, kind: ConfigKind) -> Result<Mapping> {
    if !path.exists() {
        debug!(path = %path.display(), "no {kind} config");
        return Ok(Mapping::new());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {kind} config at {}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(Mapping::new());
    }

    let parse_error = |reason: String| InstallError::ConfigParse {
        kind,
        path: path.to_path_buf(),
        reason,
    };
    match serde_yaml::from_str::<Value>(&raw).map_err(|err| parse_error(err.to_string()))? {
        Value::Mapping(map) => {
            debug!(path = %path.display(), keys = map.len(), "loaded {kind} config");
            Ok(map)
        }
        Value::Null => {
            warn!(path = %path.display(), "{kind} config is null, treating it as empty");
            Ok(Mapping::new())
        }
        _ => Err(parse_error("expected a mapping at the top level".to_string()).into()),
    }
}

/// Overlays `existing` on top of `defaults`. Top-level keys only.
pub fn merge(defaults: &Mapping, existing: &Mapping) -> Mapping {
    let mut merged = defaults.clone();
    for (key, value) in existing {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Sets `lang`: an explicit override always wins, otherwise an unset value
/// falls back to the template default and then to [`DEFAULT_LANG`].
pub fn apply_lang(mut merged: Mapping, defaults: &Mapping, lang: Option<&str>) -> Mapping {
    let key = Value::from(LANG_KEY);
    if let Some(lang) = lang {
        merged.insert(key, Value::from(lang));
    } else if !is_set(merged.get(&key)) {
        let fallback = defaults
            .get(&key)
            .filter(|value| is_set(Some(*value)))
            .cloned()
            .unwrap_or_else(|| Value::from(DEFAULT_LANG));
        merged.insert(key, fallback);
    }
    merged
}

/// Returns the `lang` value rendered for display.
pub fn lang_of(config: &Mapping) -> String {
    match config.get(LANG_KEY) {
        Some(Value::String(lang)) => lang.clone(),
        Some(other) => serde_yaml::to_string(other)
            .map(|raw| raw.trim_end().to_string())
            .unwrap_or_default(),
        None => String::new(),
    }
}

/// Serializes `config` to `path` with exactly one trailing newline. The
/// parent directory is created when missing. An existing file keeps its
/// permissions, and a symlinked config is written through to its target.
pub fn write_config(path: &Path, config: &Mapping) -> Result<()> {
    let target = if path.is_symlink() {
        fs::canonicalize(path)
            .with_context(|| format!("failed to resolve {}", path.display()))?
    } else {
        path.to_path_buf()
    };
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let yaml = serde_yaml::to_string(config).context("failed to serialize config")?;
    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
    writeln!(file, "{}", yaml.trim_end())
        .with_context(|| format!("failed to write config to {}", path.display()))?;

    match fs::metadata(&target) {
        Ok(existing) => file
            .as_file()
            .set_permissions(existing.permissions())
            .with_context(|| format!("failed to set permissions on {}", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    }

    file.persist(&target)
        .with_context(|| format!("failed to write config to {}", path.display()))?;
    Ok(())
}

fn is_set(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}
