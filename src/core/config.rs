//! Application configuration management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::error_handling::{ExtractionError, ExtractionResult};

/// Prefix for environment overrides, e.g. `HLS_PROBE_PROBE__TIMEOUT_SECONDS=10`
pub const ENV_PREFIX: &str = "HLS_PROBE";

/// Main application configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub probe: ProbeConfig,
}

/// Settings for fetching and interpreting playlists
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Total request timeout in seconds
    pub timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
    pub user_agent: String,
    pub headers: HashMap<String, String>,
    pub proxy: Option<String>,
    /// Honour `HTTP(S)_PROXY` from the environment when no explicit proxy is set
    pub use_system_proxy: bool,
    /// Label returned when a media playlist URL reveals no resolution
    pub default_label: String,
    /// Upper bound for a playlist body
    pub max_playlist_bytes: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            connect_timeout_seconds: 10,
            user_agent: format!("HlsQualityProbe/{}", env!("CARGO_PKG_VERSION")),
            headers: HashMap::new(),
            proxy: None,
            use_system_proxy: true,
            default_label: "Default".to_string(),
            max_playlist_bytes: 4 * 1024 * 1024,
        }
    }
}

impl ProbeConfig {
    pub fn validate(&self) -> ExtractionResult<()> {
        if self.timeout_seconds == 0 {
            return Err(ExtractionError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.connect_timeout_seconds > self.timeout_seconds {
            return Err(ExtractionError::Config(format!(
                "connect_timeout_seconds ({}) exceeds timeout_seconds ({})",
                self.connect_timeout_seconds, self.timeout_seconds
            )));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ExtractionError::Config("user_agent must not be empty".into()));
        }
        if self.default_label.trim().is_empty() {
            return Err(ExtractionError::Config(
                "default_label must not be empty".into(),
            ));
        }
        if self.max_playlist_bytes == 0 {
            return Err(ExtractionError::Config(
                "max_playlist_bytes must be greater than 0".into(),
            ));
        }
        if let Some(proxy) = &self.proxy {
            url::Url::parse(proxy)
                .map_err(|e| ExtractionError::Config(format!("invalid proxy {}: {}", proxy, e)))?;
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load configuration from the default location plus environment overrides.
    ///
    /// Without a resolvable config directory (no home directory), only the
    /// defaults and environment are used.
    pub fn load() -> Result<Self> {
        Self::load_discovered(Self::get_config_path().ok(), None)
    }

    /// Load configuration layered as defaults, optional JSON file, then environment
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        Self::load_layered(path, None)
    }

    fn load_discovered(
        path: Option<PathBuf>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self> {
        if path.is_none() {
            tracing::warn!(
                "No configuration directory available, using defaults and environment"
            );
        }
        Self::load_layered(path.as_deref(), env)
    }

    fn load_layered(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config: AppConfig = builder
            .build()
            .with_context(|| format!("Failed to read configuration (file: {:?})", path))?
            .try_deserialize()
            .with_context(|| "Failed to parse configuration")?;

        config
            .probe
            .validate()
            .with_context(|| "Configuration is invalid")?;

        tracing::debug!("Loaded configuration (file: {:?})", path);
        Ok(config)
    }

    /// Save configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        std::fs::write(path, self.export()?)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        tracing::info!("Saved configuration to: {:?}", path);
        Ok(())
    }

    /// Export configuration as JSON string
    pub fn export(&self) -> Result<String> {
        serde_json::to_string_pretty(self).with_context(|| "Failed to export configuration")
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "videodownloader", "hls-probe")
            .with_context(|| "Failed to get project directories")?;

        Ok(project_dirs.config_dir().join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.probe.validate().is_ok());
        assert_eq!(config.probe.default_label, "Default");
        assert_eq!(config.probe.timeout_seconds, 30);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut probe = ProbeConfig {
            timeout_seconds: 0,
            ..ProbeConfig::default()
        };
        assert!(probe.validate().is_err());

        probe.timeout_seconds = 5;
        probe.connect_timeout_seconds = 10;
        assert!(probe.validate().is_err());

        probe.connect_timeout_seconds = 5;
        probe.default_label = "  ".to_string();
        assert!(probe.validate().is_err());

        probe.default_label = "Auto".to_string();
        probe.proxy = Some("not a url".to_string());
        let err = probe.validate().unwrap_err();
        assert!(err.to_string().contains("invalid proxy"));

        probe.proxy = Some("http://proxy.local:8080".to_string());
        assert!(probe.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.probe.default_label = "Auto".to_string();
        config.probe.timeout_seconds = 12;
        config
            .probe
            .headers
            .insert("referer".to_string(), "https://example.com/".to_string());
        config.save(&path).unwrap();

        let loaded = AppConfig::load_layered(Some(&path), Some(HashMap::new())).unwrap();
        assert_eq!(loaded.probe.default_label, "Auto");
        assert_eq!(loaded.probe.timeout_seconds, 12);
        assert_eq!(
            loaded.probe.headers.get("referer").map(String::as_str),
            Some("https://example.com/")
        );
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{ "probe": { "default_label": "Source" } }"#).unwrap();

        let loaded = AppConfig::load_layered(Some(&path), Some(HashMap::new())).unwrap();
        assert_eq!(loaded.probe.default_label, "Source");
        assert_eq!(loaded.probe.connect_timeout_seconds, 10);
        assert_eq!(loaded.probe.max_playlist_bytes, 4 * 1024 * 1024);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("absent.json");

        let loaded = AppConfig::load_layered(Some(&path), Some(HashMap::new())).unwrap();
        assert_eq!(loaded.probe.default_label, "Default");
    }

    #[test]
    fn test_missing_config_dir_uses_defaults_and_environment() {
        let mut env = HashMap::new();
        env.insert(
            "HLS_PROBE_PROBE__TIMEOUT_SECONDS".to_string(),
            "15".to_string(),
        );

        let loaded = AppConfig::load_discovered(None, Some(env)).unwrap();
        assert_eq!(loaded.probe.timeout_seconds, 15);
        assert_eq!(loaded.probe.default_label, "Default");
    }

    #[test]
    fn test_environment_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{ "probe": { "timeout_seconds": 20 } }"#).unwrap();

        let mut env = HashMap::new();
        env.insert(
            "HLS_PROBE_PROBE__TIMEOUT_SECONDS".to_string(),
            "15".to_string(),
        );

        let loaded = AppConfig::load_layered(Some(&path), Some(env)).unwrap();
        assert_eq!(loaded.probe.timeout_seconds, 15);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{ "probe": { "timeout_seconds": 0 } }"#).unwrap();

        assert!(AppConfig::load_layered(Some(&path), Some(HashMap::new())).is_err());
    }
}
