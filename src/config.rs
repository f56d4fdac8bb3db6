//! Configuration management with validation and defaults
//!
//! Settings come from three layers: built-in defaults, an optional TOML file,
//! and `DICEBET_*` environment variables. Command-line flags are applied by the
//! binaries on top of the loaded result.

use crate::errors::{ConfigurationError, DiceBetResult};
use serde::{Deserialize, Serialize};
use std::{env, net::IpAddr, path::Path, time::Duration};

/// Complete dicebet configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiceBetConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub client: ClientConfig,
    pub engine: EngineConfig,
    pub monitoring: MonitoringConfig,
}

/// HTTP server settings for the roll provider service
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins, `*` permits any origin
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            allowed_origins: vec!["*".to_string()],
            request_timeout_secs: 30,
        }
    }
}

/// Randomness source selection for the server
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Fixed seed for reproducible rolls; `None` uses the thread RNG
    pub seed: Option<u64>,
}

/// Settings the betting client uses to reach the provider
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub provider_url: String,
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            provider_url: "http://localhost:5000/roll-dice".to_string(),
            request_timeout_ms: 5_000,
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Session defaults restored by a reset
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub starting_balance: i64,
    pub default_bet: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_balance: 1000,
            default_bet: 10,
        }
    }
}

/// Logging and metrics configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enable_metrics: bool,
    pub log_level: LogLevel,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enable_metrics: true,
            log_level: LogLevel::Info,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(ConfigurationError::InvalidValue {
                field: "monitoring.log_level".to_string(),
                value: s.to_string(),
                reason: "Expected one of error, warn, info, debug, trace".to_string(),
            }),
        }
    }
}

/// Configuration loader with environment variable support
#[derive(Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> DiceBetResult<DiceBetConfig> {
        let mut config = match self.config_path {
            Some(ref path) => self.load_from_file(path)?,
            None => DiceBetConfig::default(),
        };

        apply_overrides(&mut config, |key| env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML file
    fn load_from_file(&self, path: &str) -> DiceBetResult<DiceBetConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into())
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, value: String, reason: &str) -> Result<T, ConfigurationError> {
    value.parse().map_err(|_| ConfigurationError::InvalidValue {
        field: key.to_string(),
        value,
        reason: reason.to_string(),
    })
}

/// Apply `DICEBET_*` overrides using `lookup` to read variables.
pub fn apply_overrides<F>(config: &mut DiceBetConfig, lookup: F) -> Result<(), ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    // Server overrides
    if let Some(host) = lookup("DICEBET_HOST") {
        config.server.host = host;
    }
    if let Some(port) = lookup("DICEBET_PORT") {
        config.server.port = parse_override("DICEBET_PORT", port, "Invalid port number")?;
    }
    if let Some(origins) = lookup("DICEBET_CORS_ORIGINS") {
        config.server.allowed_origins = origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if let Some(seed) = lookup("DICEBET_SEED") {
        config.provider.seed = Some(parse_override("DICEBET_SEED", seed, "Invalid seed")?);
    }

    // Client overrides
    if let Some(url) = lookup("DICEBET_PROVIDER_URL") {
        config.client.provider_url = url;
    }
    if let Some(timeout) = lookup("DICEBET_PROVIDER_TIMEOUT_MS") {
        config.client.request_timeout_ms =
            parse_override("DICEBET_PROVIDER_TIMEOUT_MS", timeout, "Invalid timeout value")?;
    }

    if let Some(level) = lookup("DICEBET_LOG_LEVEL") {
        config.monitoring.log_level = level.parse()?;
    }

    Ok(())
}

impl DiceBetConfig {
    /// Validate configuration for logical consistency
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.server.host.parse::<IpAddr>().is_err() {
            return Err(ConfigurationError::InvalidValue {
                field: "server.host".to_string(),
                value: self.server.host.clone(),
                reason: "Host must be an IP address".to_string(),
            });
        }

        if self.server.allowed_origins.is_empty() {
            return Err(ConfigurationError::ValidationFailed(
                "server.allowed_origins must list at least one origin (use \"*\" for any)".to_string(),
            ));
        }

        if self.server.request_timeout_secs == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "server.request_timeout_secs".to_string(),
                value: "0".to_string(),
                reason: "Timeout cannot be zero".to_string(),
            });
        }

        if self.client.request_timeout_ms == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "client.request_timeout_ms".to_string(),
                value: "0".to_string(),
                reason: "Timeout cannot be zero".to_string(),
            });
        }

        if let Err(e) = reqwest::Url::parse(&self.client.provider_url) {
            return Err(ConfigurationError::InvalidValue {
                field: "client.provider_url".to_string(),
                value: self.client.provider_url.clone(),
                reason: e.to_string(),
            });
        }

        if self.engine.starting_balance <= 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "engine.starting_balance".to_string(),
                value: self.engine.starting_balance.to_string(),
                reason: "Starting balance must be positive".to_string(),
            });
        }

        if self.engine.default_bet < 1 || self.engine.default_bet > self.engine.starting_balance {
            return Err(ConfigurationError::InvalidValue {
                field: "engine.default_bet".to_string(),
                value: self.engine.default_bet.to_string(),
                reason: format!("Default bet must be within 1..={}", self.engine.starting_balance),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = DiceBetConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.allowed_origins, vec!["*".to_string()]);
        assert_eq!(config.engine.starting_balance, 1000);
        assert_eq!(config.engine.default_bet, 10);
        assert!(config.provider.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = DiceBetConfig::default();
        config.engine.default_bet = 0;
        assert!(config.validate().is_err());

        let mut config = DiceBetConfig::default();
        config.engine.default_bet = 1001;
        assert!(config.validate().is_err());

        let mut config = DiceBetConfig::default();
        config.client.provider_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = DiceBetConfig::default();
        config.server.host = "localhost:5000".to_string();
        assert!(config.validate().is_err());

        let mut config = DiceBetConfig::default();
        config.server.allowed_origins.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_toml_file() -> DiceBetResult<()> {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 7000
allowed_origins = ["http://localhost:3000"]

[provider]
seed = 42

[monitoring]
log_level = "debug"
"#
        )
        .unwrap();

        let config = ConfigLoader::new().with_path(file.path()).load()?;

        assert_eq!(config.server.port, 7000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.allowed_origins, vec!["http://localhost:3000".to_string()]);
        assert_eq!(config.provider.seed, Some(42));
        assert_eq!(config.monitoring.log_level, LogLevel::Debug);
        assert_eq!(config.engine, EngineConfig::default());
        Ok(())
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = ConfigLoader::new()
            .with_path("/nonexistent/dicebet.toml")
            .load();
        assert!(result.is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = DiceBetConfig::default();
        let lookup = lookup_from(&[
            ("DICEBET_PORT", "8088"),
            ("DICEBET_CORS_ORIGINS", "http://a.test, http://b.test"),
            ("DICEBET_PROVIDER_URL", "http://127.0.0.1:9999/roll-dice"),
            ("DICEBET_SEED", "7"),
            ("DICEBET_LOG_LEVEL", "WARN"),
        ]);

        apply_overrides(&mut config, lookup).unwrap();

        assert_eq!(config.server.port, 8088);
        assert_eq!(
            config.server.allowed_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert_eq!(config.client.provider_url, "http://127.0.0.1:9999/roll-dice");
        assert_eq!(config.provider.seed, Some(7));
        assert_eq!(config.monitoring.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_invalid_env_override() {
        let mut config = DiceBetConfig::default();
        let err = apply_overrides(&mut config, lookup_from(&[("DICEBET_PORT", "eighty")]))
            .unwrap_err();

        match err {
            ConfigurationError::InvalidValue { field, value, .. } => {
                assert_eq!(field, "DICEBET_PORT");
                assert_eq!(value, "eighty");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
