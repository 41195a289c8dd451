// TOML config adapter - Configuration management using TOML files

use crate::domain::errors::*;
use crate::ports::*;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Table holding the studio settings in a config file
pub const CONFIG_TABLE: &str = "studio";

pub const KEY_BACKEND_URL: &str = "backend_url";
pub const KEY_DOWNLOAD_DIR: &str = "download_dir";
pub const KEY_LOG_LEVEL: &str = "log_level";
pub const KEY_LOG_FORMAT: &str = "log_format";

/// Built-in defaults, lowest precedence
pub const DEFAULTS: &[(&str, &str)] = &[
    (KEY_BACKEND_URL, "http://127.0.0.1:8000"),
    (KEY_DOWNLOAD_DIR, "downloads"),
    (KEY_LOG_LEVEL, "info"),
    (KEY_LOG_FORMAT, "text"),
];

/// TOML configuration adapter
pub struct TomlConfigAdapter {
    config: Arc<RwLock<HashMap<String, String>>>,
    config_file_path: Arc<RwLock<Option<PathBuf>>>,
}

impl TomlConfigAdapter {
    /// Create an adapter seeded with the defaults
    pub fn new() -> Self {
        let config = DEFAULTS
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        Self {
            config: Arc::new(RwLock::new(config)),
            config_file_path: Arc::new(RwLock::new(None)),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, String>>, DomainError> {
        self.config
            .read()
            .map_err(|_| DomainError::Config("Configuration lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, String>>, DomainError> {
        self.config
            .write()
            .map_err(|_| DomainError::Config("Configuration lock poisoned".to_string()))
    }

    /// Merge the `[studio]` table of a TOML document
    ///
    /// Non-string scalars are stored in their TOML text form.
    fn deserialize_config(&self, toml_content: &str) -> Result<(), DomainError> {
        let parsed: toml::Value = toml::from_str(toml_content)
            .map_err(|e| DomainError::Config(format!("Failed to parse TOML config: {}", e)))?;

        let table = match parsed.get(CONFIG_TABLE).and_then(|section| section.as_table()) {
            Some(table) => table,
            None => {
                tracing::debug!("No [{}] table in config file", CONFIG_TABLE);
                return Ok(());
            }
        };

        let mut config = self.write()?;
        for (key, value) in table {
            let text = match value {
                toml::Value::String(s) => s.clone(),
                toml::Value::Integer(_) | toml::Value::Float(_) | toml::Value::Boolean(_) => {
                    value.to_string()
                }
                _ => {
                    tracing::warn!("Ignoring non-scalar config key {}", key);
                    continue;
                }
            };
            config.insert(key.clone(), text);
        }

        Ok(())
    }
}

impl Default for TomlConfigAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigPort for TomlConfigAdapter {
    async fn get_config(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.read()?.get(key).cloned())
    }

    async fn set_config(&self, key: &str, value: &str) -> Result<(), DomainError> {
        self.write()?.insert(key.to_string(), value.to_string());
        tracing::debug!("Set config {} = {}", key, value);
        Ok(())
    }

    async fn load_config(&self, file_path: &str) -> Result<(), DomainError> {
        let path = PathBuf::from(file_path);

        if !path.exists() {
            return Err(DomainError::Config(format!(
                "Config file does not exist: {}",
                file_path
            )));
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| DomainError::Io(format!("Failed to read config file: {}", e)))?;

        self.deserialize_config(&content)?;
        let mut config_path = self
            .config_file_path
            .write()
            .map_err(|_| DomainError::Config("Configuration lock poisoned".to_string()))?;
        *config_path = Some(path);

        tracing::info!("Loaded configuration from {}", file_path);
        Ok(())
    }

    async fn validate_config(&self) -> Result<(), DomainError> {
        let config = self.read()?;

        if let Some(log_level) = config.get(KEY_LOG_LEVEL) {
            LogLevel::parse(log_level)?;
        }

        if let Some(format) = config.get(KEY_LOG_FORMAT) {
            if !matches!(format.as_str(), "text" | "json") {
                return Err(DomainError::Config(format!(
                    "Invalid log format: {}. Valid formats: text, json",
                    format
                )));
            }
        }

        if let Some(url) = config.get(KEY_BACKEND_URL) {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(DomainError::Config(format!(
                    "Backend URL must start with http:// or https://: {}",
                    url
                )));
            }
        }

        if let Some(dir) = config.get(KEY_DOWNLOAD_DIR) {
            if dir.trim().is_empty() {
                return Err(DomainError::Config(
                    "Download directory cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    async fn get_config_file_path(&self) -> Result<Option<String>, DomainError> {
        let config_path = self
            .config_file_path
            .read()
            .map_err(|_| DomainError::Config("Configuration lock poisoned".to_string()))?;
        Ok(config_path
            .as_ref()
            .map(|path| path.to_string_lossy().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_defaults() {
        let adapter = TomlConfigAdapter::new();
        assert_eq!(
            adapter.get_config(KEY_BACKEND_URL).await.unwrap().as_deref(),
            Some("http://127.0.0.1:8000")
        );
        assert!(adapter.get_config("missing").await.unwrap().is_none());
        assert!(adapter.get_config_file_path().await.unwrap().is_none());
        assert!(adapter.validate_config().await.is_ok());
    }

    #[tokio::test]
    async fn test_load_studio_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[studio]\nbackend_url = \"http://backend:9000\"\nlog_level = \"debug\"\nretries = 3\n\n[other]\nlog_level = \"error\""
        )
        .unwrap();
        let path = file.path().to_string_lossy().to_string();

        let adapter = TomlConfigAdapter::new();
        adapter.load_config(&path).await.unwrap();

        assert_eq!(
            adapter.get_config(KEY_BACKEND_URL).await.unwrap().as_deref(),
            Some("http://backend:9000")
        );
        assert_eq!(
            adapter.get_config(KEY_LOG_LEVEL).await.unwrap().as_deref(),
            Some("debug")
        );
        assert_eq!(adapter.get_config("retries").await.unwrap().as_deref(), Some("3"));
        assert_eq!(
            adapter.get_config(KEY_DOWNLOAD_DIR).await.unwrap().as_deref(),
            Some("downloads")
        );
        assert_eq!(adapter.get_config_file_path().await.unwrap(), Some(path));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let adapter = TomlConfigAdapter::new();
        let err = adapter.load_config("/nonexistent/studio.toml").await.unwrap_err();
        assert!(matches!(err, DomainError::Config(_)));
    }

    #[tokio::test]
    async fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[studio\nbackend_url = ").unwrap();

        let adapter = TomlConfigAdapter::new();
        let err = adapter
            .load_config(&file.path().to_string_lossy())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML config"));
    }

    #[tokio::test]
    async fn test_validation() {
        let adapter = TomlConfigAdapter::new();

        adapter.set_config(KEY_LOG_LEVEL, "loud").await.unwrap();
        assert!(adapter.validate_config().await.is_err());
        adapter.set_config(KEY_LOG_LEVEL, "warn").await.unwrap();

        adapter.set_config(KEY_LOG_FORMAT, "xml").await.unwrap();
        assert!(adapter.validate_config().await.is_err());
        adapter.set_config(KEY_LOG_FORMAT, "json").await.unwrap();

        adapter.set_config(KEY_BACKEND_URL, "ftp://host").await.unwrap();
        assert!(adapter.validate_config().await.is_err());
        adapter.set_config(KEY_BACKEND_URL, "https://host").await.unwrap();

        assert!(adapter.validate_config().await.is_ok());
    }
}
