use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Presentation settings shared by every export encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// chrono format string for human-readable Created-At cells.
    pub timestamp_format: String,
    /// chrono format string for calendar days in analytics output.
    pub day_format: String,
    /// Joins the selected options of a checkbox answer.
    pub list_separator: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            timestamp_format: "%Y-%m-%d %H:%M:%S UTC".into(),
            day_format: "%a %b %d %Y".into(),
            list_separator: ",".into(),
        }
    }
}

/// Application configuration stored at `~/.formcraft/config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormcraftConfig {
    /// Overrides the default database location.
    pub database_path: Option<PathBuf>,
    pub log_level: String,
    pub export: ExportOptions,
}

impl Default for FormcraftConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            log_level: "info".into(),
            export: ExportOptions::default(),
        }
    }
}

impl FormcraftConfig {
    /// Returns the base config directory: `~/.formcraft/`
    pub fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".formcraft"))
    }

    /// Returns the config file path: `~/.formcraft/config.json`
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("config.json"))
    }

    /// Returns the logs directory: `~/.formcraft/logs/`
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("logs"))
    }

    /// Database path: the configured override, else `~/.formcraft/forms.db`.
    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::base_dir()?.join("forms.db")),
        }
    }

    /// Loads config from disk, or creates default if missing.
    pub fn load() -> Result<Self> {
        let base = Self::base_dir()?;
        std::fs::create_dir_all(&base)
            .with_context(|| format!("Failed to create directory: {}", base.display()))?;
        Self::load_from_path(&Self::config_path()?)
    }

    /// Load config from a specific file path, writing defaults when it does not exist.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: Self = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?;
            info!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to_path(path)?;
            info!("Created default config at {}", path.display());
            Ok(config)
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_export_options() {
        let opts = ExportOptions::default();
        assert_eq!(opts.list_separator, ",");
        assert!(opts.timestamp_format.contains("%H"));
    }

    #[test]
    fn test_load_from_path_creates_default() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        let config = FormcraftConfig::load_from_path(&path).unwrap();
        assert_eq!(config, FormcraftConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_save_and_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        let mut config = FormcraftConfig::default();
        config.log_level = "debug".into();
        config.export.list_separator = "; ".into();
        config.database_path = Some(tmp.path().join("custom.db"));
        config.save_to_path(&path).unwrap();

        let loaded = FormcraftConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.db_path().unwrap(), tmp.path().join("custom.db"));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{"export": {"list_separator": " | "}}"#).unwrap();

        let loaded = FormcraftConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded.log_level, "info");
        assert_eq!(loaded.export.list_separator, " | ");
        assert_eq!(
            loaded.export.day_format,
            ExportOptions::default().day_format
        );
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = FormcraftConfig::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }
}
