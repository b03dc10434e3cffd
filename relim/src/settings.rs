//! Persisted user settings: output precision and hidden rules

use std::collections::HashSet;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_PRECISION: u32 = 2;
pub const MAX_PRECISION: u32 = 9;

const SETTINGS_ENV: &str = "RELIM_SETTINGS";
const SETTINGS_FILE: &str = "relim-settings.json";
const RULES_ENV: &str = "RELIM_RULES";
const RULES_FILE: &str = "rules.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot write settings file {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("settings file {} is malformed: {source}", .path.display())]
    Malformed { path: PathBuf, source: serde_json::Error },

    #[error("precision must be at most {max} decimal places, got {0}", max = MAX_PRECISION)]
    Precision(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Decimal places in rendered output
    pub precision: u32,
    /// Names of rules that are not displayed
    pub hidden: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self { precision: DEFAULT_PRECISION, hidden: Vec::new() }
    }
}

impl Settings {
    /// Load settings; a missing file yields the defaults and an out of range
    /// precision is replaced by `DEFAULT_PRECISION`
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => return Err(SettingsError::Read { path: path.to_path_buf(), source }),
        };

        let mut settings: Settings = serde_json::from_str(&text)
            .map_err(|source| SettingsError::Malformed { path: path.to_path_buf(), source })?;
        if settings.precision > MAX_PRECISION {
            warn!(
                path = %path.display(),
                precision = settings.precision,
                fallback = DEFAULT_PRECISION,
                "stored precision out of range, using default"
            );
            settings.precision = DEFAULT_PRECISION;
        }
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|source| SettingsError::Malformed { path: path.to_path_buf(), source })?;
        fs::write(path, text + "\n").map_err(|source| SettingsError::Write { path: path.to_path_buf(), source })
    }

    pub fn set_precision(&mut self, precision: u32) -> Result<(), SettingsError> {
        if precision > MAX_PRECISION {
            return Err(SettingsError::Precision(precision));
        }
        self.precision = precision;
        Ok(())
    }

    pub fn hide(&mut self, name: &str) {
        if !self.hidden.iter().any(|h| h == name) {
            self.hidden.push(name.to_string());
        }
    }

    pub fn show(&mut self, name: &str) {
        self.hidden.retain(|h| h != name);
    }

    pub fn hidden_set(&self) -> HashSet<String> {
        self.hidden.iter().cloned().collect()
    }
}

/// Settings file: command line, then `RELIM_SETTINGS`, then the working directory
pub fn settings_path(cli: Option<PathBuf>) -> PathBuf {
    resolve_path(cli, SETTINGS_ENV, SETTINGS_FILE)
}

/// Rule file: command line, then `RELIM_RULES`, then the working directory
pub fn rules_path(cli: Option<PathBuf>) -> PathBuf {
    resolve_path(cli, RULES_ENV, RULES_FILE)
}

fn resolve_path(cli: Option<PathBuf>, var: &str, default: &str) -> PathBuf {
    cli.or_else(|| env::var_os(var).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str) -> PathBuf {
        env::temp_dir().join(format!("relim-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let settings = Settings::load(&temp_file("does-not-exist")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.precision, 2);
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_file("save-load");
        let mut settings = Settings::default();
        settings.set_precision(4).unwrap();
        settings.hide("Liquid release");
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_file_uses_defaults_for_missing_keys() {
        let path = temp_file("partial");
        fs::write(&path, r#"{ "hidden": ["a"] }"#).unwrap();
        let loaded = Settings::load(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(loaded.precision, DEFAULT_PRECISION);
        assert_eq!(loaded.hidden, vec!["a".to_string()]);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let path = temp_file("malformed");
        fs::write(&path, "precision = 3").unwrap();
        let err = Settings::load(&path).unwrap_err();
        fs::remove_file(&path).unwrap();
        assert!(matches!(err, SettingsError::Malformed { .. }));
    }

    #[test]
    fn test_precision_limit() {
        let mut settings = Settings::default();
        assert!(matches!(settings.set_precision(12), Err(SettingsError::Precision(12))));
        assert_eq!(settings.precision, DEFAULT_PRECISION);
    }

    #[test]
    fn test_stored_precision_out_of_range_falls_back() {
        let path = temp_file("bad-precision");
        fs::write(&path, r#"{ "precision": 12, "hidden": ["a"] }"#).unwrap();
        let mut loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded.precision, DEFAULT_PRECISION);
        assert_eq!(loaded.hidden, vec!["a".to_string()]);

        // the repaired value is what gets written back
        loaded.set_precision(3).unwrap();
        loaded.save(&path).unwrap();
        let reloaded = Settings::load(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(reloaded.precision, 3);
    }

    #[test]
    fn test_hide_and_show() {
        let mut settings = Settings::default();
        settings.hide("a");
        settings.hide("a");
        settings.hide("b");
        assert_eq!(settings.hidden, vec!["a", "b"]);
        settings.show("a");
        assert_eq!(settings.hidden_set(), ["b".to_string()].into_iter().collect::<HashSet<String>>());
    }

    #[test]
    fn test_cli_path_wins() {
        let path = rules_path(Some(PathBuf::from("/tmp/custom.json")));
        assert_eq!(path, PathBuf::from("/tmp/custom.json"));
    }
}
