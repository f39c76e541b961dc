//! Configuration Loader
//!
//! Environment-aware loading: base file, environment overlay file, then
//! `STIPS__*` environment variables, merged by the `config` crate.

use super::error::{ConfigResult, ConfigurationError};
use super::EngineConfig;
use config::{Config, Environment, File};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const BASE_FILE_NAME: &str = "stips.toml";
const ENV_PREFIX: &str = "STIPS";
const ENV_SEPARATOR: &str = "__";

/// Loaded and validated engine configuration plus where it came from
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: EngineConfig,
    environment: String,
    sources: Vec<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment
    /// This is useful for testing without modifying global environment variables
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);
        let candidates = [
            config_directory.join(BASE_FILE_NAME),
            config_directory.join(format!("stips.{environment}.toml")),
        ];
        let files: Vec<PathBuf> = candidates.into_iter().filter(|path| path.exists()).collect();

        debug!(
            environment = environment,
            directory = %config_directory.display(),
            files = files.len(),
            "Loading engine configuration"
        );

        Self::build(files, environment, None).map(Arc::new)
    }

    /// Load configuration from one explicit file plus environment variables
    pub fn load_from_file(path: &Path) -> ConfigResult<Arc<ConfigManager>> {
        if !path.exists() {
            return Err(ConfigurationError::ConfigFileNotFound {
                path: path.to_path_buf(),
            });
        }
        let environment = Self::detect_environment();
        Self::build(vec![path.to_path_buf()], &environment, None).map(Arc::new)
    }

    /// Load from files with an explicit set of environment variables instead of the process environment
    pub fn load_with_env_vars(
        files: Vec<PathBuf>,
        environment: &str,
        vars: config::Map<String, String>,
    ) -> ConfigResult<ConfigManager> {
        Self::build(files, environment, Some(vars))
    }

    /// Wrap an already-built configuration after validating it
    pub fn from_config(config: EngineConfig) -> ConfigResult<ConfigManager> {
        config.validate()?;
        Ok(ConfigManager {
            config,
            environment: Self::detect_environment(),
            sources: Vec::new(),
        })
    }

    fn build(
        files: Vec<PathBuf>,
        environment: &str,
        vars: Option<config::Map<String, String>>,
    ) -> ConfigResult<ConfigManager> {
        let mut builder = Config::builder();
        for file in &files {
            builder = builder.add_source(File::from(file.as_path()).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .source(vars),
        );

        let config: EngineConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        info!(
            environment = environment,
            max_active_tasks_per_va = config.max_active_tasks_per_va,
            task_types = config.task_types.len(),
            sources = ?files,
            "Engine configuration loaded"
        );

        Ok(ConfigManager {
            config,
            environment: environment.to_string(),
            sources: files,
        })
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the detected or requested environment name
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Files that contributed to the configuration, in merge order
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Detect current environment from environment variables
    pub fn detect_environment() -> String {
        env::var("STIPS_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }

    fn default_config_directory() -> PathBuf {
        PathBuf::from("config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).expect("write config file");
        path
    }

    #[test]
    fn test_missing_directory_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let manager =
            ConfigManager::load_from_directory_with_env(Some(dir.path().join("nope")), "test")
                .unwrap();
        assert_eq!(manager.config(), &EngineConfig::default());
        assert!(manager.sources().is_empty());
        assert_eq!(manager.environment(), "test");
    }

    #[test]
    fn test_environment_overlay_overrides_base() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "stips.toml", "max_active_tasks_per_va = 3\nmin_reason_length = 4\n");
        write(dir.path(), "stips.production.toml", "max_active_tasks_per_va = 9\n");

        let manager =
            ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "production")
                .unwrap();
        assert_eq!(manager.config().max_active_tasks_per_va, 9);
        assert_eq!(manager.config().min_reason_length, 4);
        assert_eq!(manager.sources().len(), 2);
    }

    #[test]
    fn test_env_vars_override_files() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "stips.toml", "max_active_tasks_per_va = 3\n");

        let mut vars = config::Map::new();
        vars.insert("STIPS__MAX_ACTIVE_TASKS_PER_VA".to_string(), "12".to_string());

        let manager = ConfigManager::load_with_env_vars(vec![file], "test", vars).unwrap();
        assert_eq!(manager.config().max_active_tasks_per_va, 12);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "stips.toml", "notification_channel_capacity = 0\n");

        let err = ConfigManager::load_with_env_vars(vec![file], "test", config::Map::new())
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidValue { .. }));
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let dir = TempDir::new().unwrap();
        let err = ConfigManager::load_from_file(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigurationError::ConfigFileNotFound { .. }));
    }
}
