use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub(crate) const DB_ENV: &str = "EXPENSESINK_DB";
pub(crate) const LOG_ENV: &str = "EXPENSESINK_LOG";

const CONFIG_FILE: &str = "config.json";
const DB_FILE: &str = "expensesink.db";
const LOG_FILE: &str = "expensesink.log";

/// User settings read from `config.json`. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub(crate) database_path: Option<PathBuf>,
    pub(crate) currency_symbol: String,
    pub(crate) log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            currency_symbol: "$".into(),
            log_level: "info".into(),
        }
    }
}

/// Per-user directories for the config file, database and log.
#[derive(Debug, Clone)]
pub(crate) struct AppDirs {
    pub(crate) config_dir: PathBuf,
    pub(crate) data_dir: PathBuf,
}

impl AppDirs {
    pub(crate) fn discover() -> Result<Self> {
        let proj_dirs = directories::ProjectDirs::from("com", "expensesink", "ExpenseSink")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let dirs = Self {
            config_dir: proj_dirs.config_dir().to_path_buf(),
            data_dir: proj_dirs.data_dir().to_path_buf(),
        };
        for dir in [&dirs.config_dir, &dirs.data_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(dirs)
    }

    pub(crate) fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    pub(crate) fn log_file(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }
}

impl Config {
    /// Load `path`, or the defaults when it does not exist.
    pub(crate) fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub(crate) fn save_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config: {}", path.display()))
    }

    /// Apply `EXPENSESINK_DB` and `EXPENSESINK_LOG` overrides.
    pub(crate) fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(db) = lookup(DB_ENV).filter(|v| !v.trim().is_empty()) {
            self.database_path = Some(PathBuf::from(crate::run::shellexpand(db.trim())));
        }
        if let Some(level) = lookup(LOG_ENV).filter(|v| !v.trim().is_empty()) {
            self.log_level = level.trim().to_string();
        }
        self
    }

    pub(crate) fn database_path(&self, dirs: &AppDirs) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| dirs.data_dir.join(DB_FILE))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dirs(base: &Path) -> AppDirs {
        AppDirs {
            config_dir: base.join("config"),
            data_dir: base.join("data"),
        }
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.currency_symbol, "$");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "currency_symbol": "€" }"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.currency_symbol, "€");
        assert_eq!(config.log_level, "info");
        assert!(config.database_path.is_none());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = Config {
            database_path: Some(dir.path().join("x.db")),
            currency_symbol: "£".into(),
            log_level: "debug".into(),
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default().with_env(|key| match key {
            DB_ENV => Some("/tmp/other.db".into()),
            LOG_ENV => Some("expensesink=debug".into()),
            _ => None,
        });
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/other.db")));
        assert_eq!(config.log_level, "expensesink=debug");
    }

    #[test]
    fn test_blank_env_ignored() {
        let config = Config::default().with_env(|_| Some("  ".into()));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_database_path_resolution() {
        let base = Path::new("/home/user");
        let d = dirs(base);
        assert_eq!(
            Config::default().database_path(&d),
            base.join("data").join("expensesink.db")
        );

        let custom = Config {
            database_path: Some(PathBuf::from("/srv/books.db")),
            ..Default::default()
        };
        assert_eq!(custom.database_path(&d), PathBuf::from("/srv/books.db"));
        assert_eq!(d.log_file(), base.join("data").join("expensesink.log"));
        assert_eq!(d.config_file(), base.join("config").join("config.json"));
    }
}
