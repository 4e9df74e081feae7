//! paycoord configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::dedup::{DEFAULT_GRACE_WINDOW_MS, DEFAULT_WATCH_PATTERN, WatchList};
use crate::payload::{DEFAULT_OPTIONAL_FIELDS, DEFAULT_REQUIRED_FIELDS};

/// Main paycoord configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Network primitive settings
    pub http: HttpConfig,

    /// Deduplication settings
    pub dedup: DedupConfig,

    /// Resource prefetch settings
    pub prefetch: PrefetchConfig,

    /// Payment endpoint and payload shape
    pub payment: PaymentConfig,

    /// Payment form behaviour
    pub form: FormConfig,
}

impl Config {
    /// Validate configuration before use
    pub fn validate(&self) -> Result<()> {
        WatchList::parse(&self.dedup.watch).context("Invalid dedup.watch pattern")?;

        if self.http.timeout_ms == 0 {
            return Err(eyre::eyre!("http.timeout-ms must be greater than zero"));
        }

        if self.payment.endpoint.is_empty() {
            return Err(eyre::eyre!("payment.endpoint must not be empty"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .paycoord.yml
        let local_config = PathBuf::from(".paycoord.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/paycoord/paycoord.yml
        if let Some(user_config) = Self::user_config_path() {
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialized
    ///
    /// Errors are ignored here; the full `load` reports them once logging works.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => [Some(PathBuf::from(".paycoord.yml")), Self::user_config_path()]
                .into_iter()
                .flatten()
                .collect(),
        };

        candidates
            .iter()
            .find(|p| p.exists())
            .and_then(|p| fs::read_to_string(p).ok())
            .and_then(|content| serde_yaml::from_str::<Config>(&content).ok())
            .and_then(|config| config.log_level)
    }

    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("paycoord").join("paycoord.yml"))
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Network primitive settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Base URL joined to relative request URLs such as `/api/pagar`
    #[serde(rename = "base-url")]
    pub base_url: Option<String>,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: 30_000,
            user_agent: format!("paycoord/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Deduplication settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// URL patterns that receive deduplication (`re:` prefix for regex)
    pub watch: Vec<String>,

    /// How long a settled entry keeps absorbing duplicates
    #[serde(rename = "grace-window-ms")]
    pub grace_window_ms: u64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            watch: vec![DEFAULT_WATCH_PATTERN.to_string()],
            grace_window_ms: DEFAULT_GRACE_WINDOW_MS,
        }
    }
}

impl DedupConfig {
    pub fn grace_window(&self) -> Duration {
        Duration::from_millis(self.grace_window_ms)
    }
}

/// Resource prefetch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefetchConfig {
    pub enabled: bool,

    /// Resources warmed at init
    pub resources: Vec<String>,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            resources: vec!["/js/checkout-new.js".to_string(), "/js/payment-status.js".to_string()],
        }
    }
}

/// Payment endpoint and payload shape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    /// Endpoint payment payloads are submitted to
    pub endpoint: String,

    /// Fields copied whenever present
    #[serde(rename = "required-fields")]
    pub required_fields: Vec<String>,

    /// Fields copied only when present and non-empty
    #[serde(rename = "optional-fields")]
    pub optional_fields: Vec<String>,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_WATCH_PATTERN.to_string(),
            required_fields: DEFAULT_REQUIRED_FIELDS.iter().map(|f| f.to_string()).collect(),
            optional_fields: DEFAULT_OPTIONAL_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Payment form behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Submit control label while a payment is processing
    #[serde(rename = "processing-label")]
    pub processing_label: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            processing_label: "Processando...".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.dedup.watch, vec!["/api/pagar".to_string()]);
        assert_eq!(config.dedup.grace_window(), Duration::from_millis(1000));
        assert_eq!(config.http.timeout_ms, 30_000);
        assert!(config.http.base_url.is_none());
        assert_eq!(config.payment.endpoint, "/api/pagar");
        assert_eq!(config.payment.required_fields.len(), 6);
        assert_eq!(config.payment.optional_fields.len(), 3);
        assert!(config.prefetch.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: debug

http:
  base-url: https://shop.example.com
  timeout-ms: 5000

dedup:
  watch:
    - /api/pagar
    - "re:^/api/checkout/.+$"
  grace-window-ms: 2500

prefetch:
  enabled: false
  resources:
    - /js/checkout-new.js

form:
  processing-label: "Processing..."
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.http.base_url.as_deref(), Some("https://shop.example.com"));
        assert_eq!(config.http.timeout_ms, 5000);
        assert_eq!(config.dedup.watch.len(), 2);
        assert_eq!(config.dedup.grace_window(), Duration::from_millis(2500));
        assert!(!config.prefetch.enabled);
        assert_eq!(config.prefetch.resources, vec!["/js/checkout-new.js".to_string()]);
        assert_eq!(config.form.processing_label, "Processing...");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
dedup:
  grace-window-ms: 200
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.dedup.grace_window_ms, 200);

        // Defaults for unspecified
        assert_eq!(config.dedup.watch, vec!["/api/pagar".to_string()]);
        assert_eq!(config.http.timeout_ms, 30_000);
        assert_eq!(config.form.processing_label, "Processando...");
    }

    #[test]
    fn test_validate_rejects_bad_pattern() {
        let mut config = Config::default();
        config.dedup.watch.push("re:[".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.http.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_path_and_log_level() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("paycoord.yml");
        fs::write(&path, "log-level: WARN\ndedup:\n  grace-window-ms: 42\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.dedup.grace_window_ms, 42);
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("WARN"));
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.yml");
        assert!(Config::load(Some(&path)).is_err());
        assert!(Config::load_log_level(Some(&path)).is_none());
    }
}
