//! Configuration loading and validation for the integration

use crate::types::{DEFAULT_ENTITY_TYPE, Endpoint, Settings};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

/// Environment variable overriding the first endpoint's URL
pub const ENV_ENDPOINT_A: &str = "STATUSPROBE_ENDPOINT_A";

/// Environment variable overriding the second endpoint's URL
pub const ENV_ENDPOINT_B: &str = "STATUSPROBE_ENDPOINT_B";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{var} is set but only {configured} endpoint(s) are configured")]
    InvalidOverride { var: &'static str, configured: usize },
}

impl From<ConfigError> for common::Error {
    fn from(err: ConfigError) -> Self {
        common::Error::config(err)
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub integration: IntegrationSettings,

    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<EndpointSettings>,

    #[serde(default)]
    pub probe: ProbeSettings,

    #[serde(default)]
    pub run: RunSettings,

    #[serde(default)]
    pub logging: LoggingSettings,

    /// File the configuration was read from, `None` for built-in defaults
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.integration.validate()?;
        self.run.validate()?;

        if self.endpoints.is_empty() {
            let mut errors = ValidationErrors::new();
            errors.add("endpoints", ValidationError::new("endpoints_empty"));
            return Err(errors);
        }

        let mut seen = HashSet::new();
        for endpoint in &self.endpoints {
            endpoint.validate()?;
            if !seen.insert(endpoint.entity.as_str()) {
                let mut errors = ValidationErrors::new();
                errors.add("endpoints", ValidationError::new("duplicate_entity_name"));
                return Err(errors);
            }
        }

        if let Some(timeout) = self.probe.timeout {
            validate_probe_timeout(&timeout).map_err(|e| {
                let mut errors = ValidationErrors::new();
                errors.add("timeout", e);
                errors
            })?;
        }

        Ok(())
    }
}

/// Integration identity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IntegrationSettings {
    #[validate(length(min = 1))]
    pub name: String,

    #[validate(length(min = 1))]
    pub version: String,
}

/// A polled endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EndpointSettings {
    #[validate(length(min = 1))]
    pub entity: String,

    #[serde(default = "default_entity_type")]
    #[validate(length(min = 1))]
    pub entity_type: String,

    #[validate(custom = "validate_endpoint_url")]
    pub url: String,
}

/// Prober settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeSettings {
    /// Unset keeps the HTTP transport's default behavior
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

/// Run settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RunSettings {
    #[validate(range(min = 1, max = 64))]
    pub max_concurrency: usize,
}

/// Logging settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: Option<String>,
    pub format: Option<String>,
}

// Default implementations

impl Default for IntegrationSettings {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            name: settings.integration_name,
            version: settings.integration_version,
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self { max_concurrency: 1 }
    }
}

impl From<&Endpoint> for EndpointSettings {
    fn from(endpoint: &Endpoint) -> Self {
        Self {
            entity: endpoint.entity.clone(),
            entity_type: endpoint.entity_type.clone(),
            url: endpoint.url.clone(),
        }
    }
}

fn default_endpoints() -> Vec<EndpointSettings> {
    Settings::default().endpoints.iter().map(Into::into).collect()
}

fn default_entity_type() -> String {
    DEFAULT_ENTITY_TYPE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            integration: IntegrationSettings::default(),
            endpoints: default_endpoints(),
            probe: ProbeSettings::default(),
            run: RunSettings::default(),
            logging: LoggingSettings::default(),
            source: None,
        }
    }
}

// Custom validators

fn validate_endpoint_url(url: &str) -> Result<(), ValidationError> {
    let parsed = Url::parse(url.trim()).map_err(|_| ValidationError::new("endpoint_url_invalid"))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(ValidationError::new("endpoint_url_scheme")),
    }
}

fn validate_probe_timeout(timeout: &Duration) -> Result<(), ValidationError> {
    let millis = timeout.as_millis();
    if millis < 1 || millis > 300_000 {
        return Err(ValidationError::new("probe_timeout_out_of_range"));
    }
    Ok(())
}

// Configuration loading implementation

impl Config {
    /// Load configuration, apply environment overrides and validate.
    ///
    /// An explicit `path` must exist. Without one, the standard locations are
    /// searched and defaults are used when none of them has a file. Runs
    /// before logging is set up, so it records `source` instead of logging.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::FileNotFound(path.to_path_buf()));
                }
                Self::parse_file(path)?
            }
            None => match Self::find_config_file() {
                Some(path) => Self::parse_file(&path)?,
                None => Self::default(),
            },
        };

        config.apply_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::parse_file(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    fn parse_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Replace endpoint URLs from `lookup`, keyed by [`ENV_ENDPOINT_A`] and
    /// [`ENV_ENDPOINT_B`].
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for (index, var) in [ENV_ENDPOINT_A, ENV_ENDPOINT_B].into_iter().enumerate() {
            let Some(url) = lookup(var) else { continue };

            let configured = self.endpoints.len();
            let endpoint = self
                .endpoints
                .get_mut(index)
                .ok_or(ConfigError::InvalidOverride { var, configured })?;

            endpoint.url = url;
        }
        Ok(())
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut paths = vec![PathBuf::from("/etc/statusprobe/integration.yaml")];

        if let Some(home_path) = Self::home_config_path() {
            paths.push(home_path);
        }

        paths.push(PathBuf::from("./statusprobe.yaml"));

        paths.into_iter().find(|p: &PathBuf| p.exists() && p.is_file())
    }

    /// Get home directory config path
    fn home_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config/statusprobe/integration.yaml"))
    }

    /// Convert to the runtime settings
    pub fn to_settings(&self) -> Settings {
        Settings {
            integration_name: self.integration.name.clone(),
            integration_version: self.integration.version.clone(),
            endpoints: self
                .endpoints
                .iter()
                .map(|e| Endpoint {
                    entity: e.entity.clone(),
                    entity_type: e.entity_type.clone(),
                    url: e.url.trim().to_string(),
                })
                .collect(),
            probe_timeout: self.probe.timeout,
            max_concurrency: self.run.max_concurrency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.integration.name, "com.new-relic.sdk-workshop");
        assert_eq!(config.endpoints.len(), 2);
        assert_eq!(config.endpoints[0].entity, "instance-a");
        assert_eq!(config.endpoints[1].entity, "instance-b");
        assert!(config.source.is_none());
    }

    #[test]
    fn test_valid_yaml_parsing() {
        let yaml = r#"
integration:
  name: com.example.web
  version: 2.0.0

endpoints:
  - entity: web-1
    url: http://10.0.0.1:8080/health
  - entity: web-2
    entity_type: api-server
    url: https://10.0.0.2/status

probe:
  timeout: 3s

run:
  max_concurrency: 2

logging:
  level: debug
  format: json
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.integration.name, "com.example.web");
        assert_eq!(config.endpoints[0].entity_type, "web-server");
        assert_eq!(config.endpoints[1].entity_type, "api-server");
        assert_eq!(config.probe.timeout, Some(Duration::from_secs(3)));
        assert_eq!(config.run.max_concurrency, 2);
        assert_eq!(config.logging.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let yaml = r#"
logging:
  level: warn
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.endpoints.len(), 2);
        assert_eq!(config.probe.timeout, None);
        assert_eq!(config.run.max_concurrency, 1);
    }

    #[test]
    fn test_empty_endpoint_list_rejected() {
        let yaml = r#"
endpoints: []
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_entity_names_rejected() {
        let yaml = r#"
endpoints:
  - entity: web
    url: http://localhost:8081/health
  - entity: web
    url: http://localhost:8082/health
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoint_url_validation() {
        assert!(validate_endpoint_url("http://localhost:8081/health").is_ok());
        assert!(validate_endpoint_url("https://example.com").is_ok());

        assert!(validate_endpoint_url("").is_err());
        assert!(validate_endpoint_url("localhost:8081").is_err());
        assert!(validate_endpoint_url("ftp://example.com/health").is_err());
    }

    #[test]
    fn test_invalid_max_concurrency() {
        let yaml = r#"
run:
  max_concurrency: 0
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());

        let yaml = r#"
run:
  max_concurrency: 500
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_probe_timeout() {
        let yaml = r#"
probe:
  timeout: 10m  # Invalid: > 5m
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides_replace_urls() {
        let mut config = Config::default();
        config
            .apply_overrides(|var| match var {
                ENV_ENDPOINT_A => Some("http://a.internal/health".to_string()),
                ENV_ENDPOINT_B => Some("http://b.internal/health".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.endpoints[0].url, "http://a.internal/health");
        assert_eq!(config.endpoints[1].url, "http://b.internal/health");
        assert_eq!(config.endpoints[0].entity, "instance-a");
    }

    #[test]
    fn test_override_without_endpoint_fails() {
        let yaml = r#"
endpoints:
  - entity: only
    url: http://localhost:8081/health
"#;
        let mut config: Config = serde_yaml::from_str(yaml).unwrap();
        let err = config
            .apply_overrides(|var| (var == ENV_ENDPOINT_B).then(|| "http://b/health".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidOverride {
                var: ENV_ENDPOINT_B,
                configured: 1
            }
        ));
    }

    #[test]
    fn test_no_overrides_is_noop() {
        let mut config = Config::default();
        config.apply_overrides(no_env).unwrap();
        assert_eq!(config.endpoints[0].url, "http://localhost:8081/health");
    }

    #[test]
    fn test_config_to_settings_conversion() {
        let mut config = Config::default();
        config.endpoints[0].url = "  http://localhost:9000/health ".to_string();
        config.probe.timeout = Some(Duration::from_millis(750));

        let settings = config.to_settings();
        assert_eq!(settings.endpoints.len(), 2);
        assert_eq!(settings.endpoints[0].url, "http://localhost:9000/health");
        assert_eq!(settings.endpoints[1].entity_type, "web-server");
        assert_eq!(settings.probe_timeout, Some(Duration::from_millis(750)));
        assert_eq!(settings.max_concurrency, 1);
    }
}
