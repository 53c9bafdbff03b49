//! Run settings.
//!
//! Layered lowest to highest: built-in defaults, the `[run]` section of
//! `bytebf.toml` in the XDG config directory (or the file named by
//! `BYTEBF_CONFIG`), the `BYTEBF_TAPE_SIZE` / `BYTEBF_MAX_STEPS` environment
//! variables, and finally command-line flags applied by the caller.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use cross_xdg::BaseDirs;
use tracing::debug;

use crate::interpreter::EofPolicy;
use crate::tape::{DEFAULT_TAPE_SIZE, TapePolicy};

pub const CONFIG_ENV: &str = "BYTEBF_CONFIG";
pub const TAPE_SIZE_ENV: &str = "BYTEBF_TAPE_SIZE";
pub const MAX_STEPS_ENV: &str = "BYTEBF_MAX_STEPS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, #[source] source: io::Error },

    #[error("invalid value {value:?} for {key} in {origin}")]
    InvalidValue { origin: String, key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub tape_size: NonZeroUsize,
    pub max_nesting: Option<usize>,
    pub max_steps: Option<u64>,
    pub tape_policy: TapePolicy,
    pub eof: EofPolicy,
    pub debug_trap: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tape_size: DEFAULT_TAPE_SIZE,
            max_nesting: None,
            max_steps: None,
            tape_policy: TapePolicy::Strict,
            eof: EofPolicy::Zero,
            debug_trap: false,
        }
    }
}

impl Settings {
    /// Defaults, then the config file if there is one, then the environment.
    pub fn load() -> Result<Settings, ConfigError> {
        let mut settings = Settings::default();
        if let Some(path) = config_path() {
            match fs::read_to_string(&path) {
                Ok(content) => {
                    debug!(path = %path.display(), "loading config file");
                    settings.apply_toml(&content, &path.display().to_string())?;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(source) => return Err(ConfigError::Read { path, source }),
            }
        }
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Apply the `[run]` section of a small TOML document. Other sections
    /// and unknown keys are ignored.
    pub fn apply_toml(&mut self, content: &str, origin: &str) -> Result<(), ConfigError> {
        for (key, value) in run_section(content) {
            let invalid = || ConfigError::InvalidValue {
                origin: origin.to_string(),
                key: key.clone(),
                value: value.clone(),
            };
            match key.as_str() {
                "tape_size" => self.tape_size = value.parse().map_err(|_| invalid())?,
                "max_nesting" => self.max_nesting = Some(value.parse().map_err(|_| invalid())?),
                "max_steps" => self.max_steps = Some(value.parse().map_err(|_| invalid())?),
                "wrap" => {
                    let wrap: bool = value.parse().map_err(|_| invalid())?;
                    self.tape_policy = if wrap { TapePolicy::Wrap } else { TapePolicy::Strict };
                }
                "eof" => self.eof = parse_eof(&value).ok_or_else(invalid)?,
                "debug_trap" => self.debug_trap = value.parse().map_err(|_| invalid())?,
                _ => debug!(%key, "ignoring unknown config key"),
            }
        }
        Ok(())
    }

    /// Apply environment overrides, looked up through `var`.
    pub fn apply_env<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let invalid = |key: &str, value: String| ConfigError::InvalidValue {
            origin: "environment".to_string(),
            key: key.to_string(),
            value,
        };
        if let Some(v) = var(TAPE_SIZE_ENV) {
            self.tape_size = v.trim().parse().map_err(|_| invalid(TAPE_SIZE_ENV, v))?;
        }
        if let Some(v) = var(MAX_STEPS_ENV) {
            self.max_steps = Some(v.trim().parse().map_err(|_| invalid(MAX_STEPS_ENV, v))?);
        }
        Ok(())
    }
}

/// Accepts `zero`, `unchanged` and `max` (also `255`).
pub fn parse_eof(value: &str) -> Option<EofPolicy> {
    match value.trim().to_ascii_lowercase().as_str() {
        "zero" | "0" => Some(EofPolicy::Zero),
        "unchanged" | "keep" => Some(EofPolicy::Unchanged),
        "max" | "255" => Some(EofPolicy::AllOnes),
        _ => None,
    }
}

fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }

    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let base_dirs = BaseDirs::new().ok()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push("bytebf.toml");
    Some(path)
}

/// Very small hand-rolled reader: `key = value` pairs under `[run]`,
/// values quoted or bare, `#` starts a comment line.
fn run_section(content: &str) -> HashMap<String, String> {
    let mut in_run = false;
    let mut map = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            in_run = line[1..line.len() - 1].trim() == "run";
            continue;
        }
        if !in_run {
            continue;
        }
        if let Some((key, raw)) = line.split_once('=') {
            let raw = raw.trim();
            let value = raw
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(raw);
            map.insert(key.trim().to_string(), value.to_string());
        }
    }
    map
}
