use serde::Deserialize;
use std::path::PathBuf;

/// Sync configuration: where the remote document lives and how to
/// authorize against it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Base URL of the liftlog-server instance.
    pub server_url: Option<String>,
    /// API key for the Bearer header.
    pub api_key: Option<String>,
    /// Opaque id of this user's remote document.
    pub document_id: Option<String>,
}

impl SyncConfig {
    pub fn is_configured(&self) -> bool {
        self.server_url.is_some() && self.api_key.is_some() && self.document_id.is_some()
    }
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the local document and credential cache
    pub data_dir: PathBuf,
    /// Remote sync settings
    pub sync: SyncConfig,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("liftlog");
        Self {
            data_dir,
            sync: SyncConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut config = Self::default();

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            config = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;
        }

        // Apply environment variable overrides
        if let Ok(data_dir) = std::env::var("LIFTLOG_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Ok(url) = std::env::var("LIFTLOG_SYNC_URL") {
            config.sync.server_url = Some(url);
        }
        if let Ok(key) = std::env::var("LIFTLOG_SYNC_API_KEY") {
            config.sync.api_key = Some(key);
        }
        if let Ok(id) = std::env::var("LIFTLOG_DOCUMENT_ID") {
            config.sync.document_id = Some(id);
        }

        Ok(config)
    }

    /// Default config file path: ~/.config/liftlog/config.yaml
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("liftlog")
            .join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    e
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.data_dir.to_string_lossy().contains("liftlog"));
        assert!(!config.sync.is_configured());
    }

    #[test]
    fn test_load_no_file_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert!(config.sync.server_url.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "data_dir: /custom/data").unwrap();
        writeln!(file, "sync:").unwrap();
        writeln!(file, "  server_url: \"http://localhost:8080\"").unwrap();
        writeln!(file, "  api_key: \"secret\"").unwrap();
        writeln!(file, "  document_id: \"doc-1\"").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert!(config.sync.is_configured());
        assert_eq!(
            config.sync.server_url.as_deref(),
            Some("http://localhost:8080")
        );
    }

    #[test]
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "sync:").unwrap();
        writeln!(file, "  api_key: \"fromfile\"").unwrap();

        // Set env var
        std::env::set_var("LIFTLOG_SYNC_API_KEY", "fromenv");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.sync.api_key.as_deref(), Some("fromenv"));

        // Clean up
        std::env::remove_var("LIFTLOG_SYNC_API_KEY");
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(Some(config_path));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
