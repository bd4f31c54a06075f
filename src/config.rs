use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::submitter::{DEFAULT_API_VERSION, DEFAULT_GRAPH_API_BASE, DEFAULT_TIMEOUT_SECS, SubmitterSettings};

pub const PRODUCTION: &str = "production";

/// Main fbcapi configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Conversions API access token (secret)
    pub access_token: Option<String>,
    /// Pixel (dataset) id events are routed to
    pub pixel_id: Option<String>,
    /// Routes events to the Test Events tab; ignored in production
    pub test_event_code: Option<String>,
    /// Name of the running environment, e.g. `production` or `local`
    pub environment: String,
    pub graph_api_base: String,
    pub api_version: String,
    pub timeout_secs: u64,
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_token: None,
            pixel_id: None,
            test_event_code: None,
            environment: PRODUCTION.to_string(),
            graph_api_base: DEFAULT_GRAPH_API_BASE.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain, then apply `FBCAPI_*` env overrides
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::load_file(config_path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            let path = Self::expand_path(path);
            return Self::load_from_file(&path).context(format!("Failed to load config from {}", path.display()));
        }

        if let Ok(env_path) = std::env::var("FBCAPI_CONFIG") {
            let path = Self::expand_path(Path::new(&env_path));
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from FBCAPI_CONFIG: {}", e);
                    }
                }
            }
        }

        let path = Self::fbcapi_dir().join("fbcapi.yaml");
        if path.exists() {
            match Self::load_from_file(&path) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }

        // Try ./fbcapi.yaml (for development)
        let local_config = PathBuf::from("fbcapi.yaml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load local config: {}", e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Overlay values from the environment; empty variables are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get("FBCAPI_ACCESS_TOKEN") {
            self.access_token = Some(v);
        }
        if let Some(v) = get("FBCAPI_PIXEL_ID") {
            self.pixel_id = Some(v);
        }
        if let Some(v) = get("FBCAPI_TEST_EVENT_CODE") {
            self.test_event_code = Some(v);
        }
        if let Some(v) = get("FBCAPI_ENV") {
            self.environment = v;
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case(PRODUCTION)
    }

    pub fn submitter_settings(&self) -> SubmitterSettings {
        SubmitterSettings {
            environment: self.environment.clone(),
            test_event_code: self.test_event_code.clone(),
            graph_api_base: self.graph_api_base.clone(),
            api_version: self.api_version.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    /// Directory holding `fbcapi.yaml`: `$FBCAPI_DIR` or `~/.config/fbcapi`
    pub fn fbcapi_dir() -> PathBuf {
        std::env::var("FBCAPI_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("fbcapi"))
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.access_token.is_none());
        assert!(config.is_production());
        assert_eq!(config.api_version, "v17.0");
        assert_eq!(config.graph_api_base, "https://graph.facebook.com");
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = "access_token: EAAB\npixel_id: '123'\nenvironment: local\ntest_event_code: TEST42\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.access_token.as_deref(), Some("EAAB"));
        assert_eq!(config.pixel_id.as_deref(), Some("123"));
        assert!(!config.is_production());
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_environment_case_insensitive() {
        let config = Config {
            environment: "Production".to_string(),
            ..Default::default()
        };
        assert!(config.is_production());
    }

    #[test]
    fn test_apply_overrides() {
        let vars = HashMap::from([
            ("FBCAPI_ACCESS_TOKEN", "from-env"),
            ("FBCAPI_ENV", "staging"),
            ("FBCAPI_PIXEL_ID", ""),
        ]);
        let mut config = Config {
            pixel_id: Some("file-pixel".to_string()),
            ..Default::default()
        };
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.access_token.as_deref(), Some("from-env"));
        assert_eq!(config.pixel_id.as_deref(), Some("file-pixel"));
        assert_eq!(config.environment, "staging");
    }

    #[test]
    fn test_submitter_settings() {
        let config = Config {
            environment: "local".to_string(),
            test_event_code: Some("TEST1".to_string()),
            timeout_secs: 5,
            ..Default::default()
        };
        let settings = config.submitter_settings();
        assert!(!settings.is_production());
        assert_eq!(settings.environment, "local");
        assert_eq!(settings.test_event_code.as_deref(), Some("TEST1"));
        assert_eq!(settings.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fbcapi.yaml");
        fs::write(&path, "pixel_id: '999'\nlog_level: debug\n").unwrap();

        let config = Config::load_file(Some(&path)).unwrap();
        assert_eq!(config.pixel_id.as_deref(), Some("999"));
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let path = PathBuf::from("/nonexistent/fbcapi.yaml");
        assert!(Config::load_file(Some(&path)).is_err());
    }

    #[test]
    fn test_expand_path_no_expansion() {
        let path = PathBuf::from("/etc/fbcapi.yaml");
        assert_eq!(Config::expand_path(&path), PathBuf::from("/etc/fbcapi.yaml"));
    }
}
