// ⚙️ Configuration - settings file, environment overrides, CLI overrides
// Precedence (last wins): defaults -> settings.json -> environment -> CLI flags

use crate::units::{HeightUnit, WeightUnit};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_DIR: &str = "bmi-tracker";
pub const HISTORY_FILE_NAME: &str = "bmi_history.json";
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const ENV_CONFIG_PATH: &str = "BMI_TRACKER_CONFIG";
pub const ENV_HISTORY: &str = "BMI_TRACKER_HISTORY";
pub const ENV_LOG: &str = "BMI_TRACKER_LOG";

/// Contents of settings.json. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub history_file: Option<PathBuf>,
    pub weight_unit: Option<WeightUnit>,
    pub height_unit: Option<HeightUnit>,
    pub log_level: Option<String>,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub history_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub history_file: PathBuf,
    pub weight_unit: WeightUnit,
    pub height_unit: HeightUnit,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl Settings {
    /// Read the settings file if it exists. A file that exists but does not
    /// parse is an error, reported with its path.
    pub fn load_from(path: &Path) -> Result<Option<Settings>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to read settings file: {:?}", path))
            }
        };

        // Strip UTF-8 BOM if present
        let content = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(&bytes[..]);

        let settings = serde_json::from_slice(content)
            .with_context(|| format!("Failed to parse settings file: {:?}", path))?;
        Ok(Some(settings))
    }

    /// `BMI_TRACKER_CONFIG` if set, else `<config dir>/bmi-tracker/settings.json`
    pub fn default_path() -> PathBuf {
        if let Ok(custom) = env::var(ENV_CONFIG_PATH) {
            return PathBuf::from(custom);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("settings.json")
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup(ENV_HISTORY).filter(|v| !v.is_empty()) {
            self.history_file = Some(PathBuf::from(val));
        }
        if let Some(val) = lookup(ENV_LOG).filter(|v| !v.is_empty()) {
            self.log_level = Some(val);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &CliOverrides) {
        if let Some(path) = &cli.history_file {
            self.history_file = Some(path.clone());
        }
        if let Some(level) = &cli.log_level {
            self.log_level = Some(level.clone());
        }
    }

    fn resolve(self, data_dir: &Path) -> Config {
        Config {
            history_file: self
                .history_file
                .unwrap_or_else(|| data_dir.join(HISTORY_FILE_NAME)),
            weight_unit: self.weight_unit.unwrap_or_default(),
            height_unit: self.height_unit.unwrap_or_default(),
            log_level: self
                .log_level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_dir: data_dir.join("logs"),
        }
    }
}

impl Config {
    /// Load settings from the default location, then apply env and CLI overrides
    pub fn load(cli: &CliOverrides) -> Result<Config> {
        let settings = Settings::load_from(&Settings::default_path())?.unwrap_or_default();
        Ok(Self::build(settings, |key| env::var(key).ok(), cli, &default_data_dir()))
    }

    fn build(
        mut settings: Settings,
        env_lookup: impl Fn(&str) -> Option<String>,
        cli: &CliOverrides,
        data_dir: &Path,
    ) -> Config {
        settings.apply_env_overrides(env_lookup);
        settings.apply_cli_overrides(cli);
        settings.resolve(data_dir)
    }
}

/// `<data dir>/bmi-tracker`, or the working directory when the platform has none
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::build(
            Settings::default(),
            env_from(&[]),
            &CliOverrides::default(),
            Path::new("/data/bmi-tracker"),
        );

        assert_eq!(config.history_file, PathBuf::from("/data/bmi-tracker/bmi_history.json"));
        assert_eq!(config.log_dir, PathBuf::from("/data/bmi-tracker/logs"));
        assert_eq!(config.weight_unit, WeightUnit::Kg);
        assert_eq!(config.height_unit, HeightUnit::Cm);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_precedence_cli_over_env_over_file() {
        let settings = Settings {
            history_file: Some(PathBuf::from("/file/history.json")),
            weight_unit: Some(WeightUnit::Lbs),
            height_unit: Some(HeightUnit::Inches),
            log_level: Some("warn".to_string()),
        };
        let env = env_from(&[(ENV_HISTORY, "/env/history.json"), (ENV_LOG, "debug")]);

        let config = Config::build(settings.clone(), &env, &CliOverrides::default(), Path::new("/d"));
        assert_eq!(config.history_file, PathBuf::from("/env/history.json"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.weight_unit, WeightUnit::Lbs);

        let cli = CliOverrides {
            history_file: Some(PathBuf::from("/cli/history.json")),
            log_level: Some("trace".to_string()),
        };
        let config = Config::build(settings, &env, &cli, Path::new("/d"));
        assert_eq!(config.history_file, PathBuf::from("/cli/history.json"));
        assert_eq!(config.log_level, "trace");
        assert_eq!(config.height_unit, HeightUnit::Inches);
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let config = Config::build(
            Settings::default(),
            env_from(&[(ENV_HISTORY, "")]),
            &CliOverrides::default(),
            Path::new("/d"),
        );
        assert_eq!(config.history_file, PathBuf::from("/d/bmi_history.json"));
    }

    #[test]
    fn test_settings_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        assert!(Settings::load_from(&path).unwrap().is_none());

        fs::write(&path, b"\xEF\xBB\xBF{\"weight_unit\": \"lbs\", \"height_unit\": \"inches\"}").unwrap();
        let settings = Settings::load_from(&path).unwrap().unwrap();
        assert_eq!(settings.weight_unit, Some(WeightUnit::Lbs));
        assert_eq!(settings.height_unit, Some(HeightUnit::Inches));
        assert!(settings.history_file.is_none());

        fs::write(&path, "{ nope").unwrap();
        let err = Settings::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("settings.json"));
    }
}
