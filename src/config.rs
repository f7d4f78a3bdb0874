//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$BOUNCEWATCH_CONFIG` (environment variable)
//! 2. `~/.config/bouncewatch/config.toml` (Linux/macOS)
//!    `%APPDATA%\bouncewatch\config.toml` (Windows)
//! 3. Built-in defaults
//!
//! The API key may also come from `$BOUNCEWATCH_API_KEY`, which wins over the
//! file. Environment lookups happen here only; the rest of the crate receives
//! plain values.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Environment variable pointing at an alternative config file.
pub const CONFIG_ENV: &str = "BOUNCEWATCH_CONFIG";

/// Environment variable holding the provider API key.
pub const API_KEY_ENV: &str = "BOUNCEWATCH_API_KEY";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Provider API access.
    pub provider: ProviderConfig,
    /// Defaults for single-address lookups.
    pub search: SearchConfig,
    /// Defaults for campaign funnels and bulk actions.
    pub funnel: SearchConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// `strftime` format string for send times.
    pub date_format: String,
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// Provider API access.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API key. Prefer `$BOUNCEWATCH_API_KEY` over storing it here.
    pub api_key: Option<String>,
    /// Base URL of the JSON API, without trailing slash.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// How far back to search and how many records to ask for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Days to look back from today.
    pub lookback_days: u32,
    /// Maximum number of records per search (provider caps at 1000).
    pub limit: u32,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d %H:%M:%S".to_string(),
            cache_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://mandrillapp.com/api/1.0".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            lookback_days: 7,
            limit: 20,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            provider: ProviderConfig::default(),
            search: SearchConfig::default(),
            // Campaign queries cover more ground than a single address.
            funnel: SearchConfig {
                lookback_days: 30,
                limit: 1000,
            },
        }
    }
}

impl Config {
    /// Parse a TOML document; missing sections and keys keep their defaults.
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Apply an API key taken from the environment, if one is set.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.provider.api_key = Some(key.trim().to_string());
        }
        self
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations, then apply
/// `$BOUNCEWATCH_API_KEY`.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    load_from_file().with_api_key(std::env::var(API_KEY_ENV).ok())
}

fn load_from_file() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match Config::from_toml(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(env_path));
    }
    dirs::config_dir().map(|d| d.join("bouncewatch").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bouncewatch")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.date_format, "%Y-%m-%d %H:%M:%S");
        assert_eq!(cfg.provider.base_url, "https://mandrillapp.com/api/1.0");
        assert_eq!(cfg.provider.timeout_secs, 30);
        assert_eq!(cfg.search.lookback_days, 7);
        assert_eq!(cfg.search.limit, 20);
        assert_eq!(cfg.funnel.limit, 1000);
        assert!(cfg.provider.api_key.is_none());
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed = Config::from_toml(&toml_str).expect("deserialize");
        assert_eq!(parsed.general.log_level, cfg.general.log_level);
        assert_eq!(parsed.funnel.lookback_days, cfg.funnel.lookback_days);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[provider]
api_key = "abc"

[search]
lookback_days = 14
"#;
        let cfg = Config::from_toml(partial).expect("parse partial");
        assert_eq!(cfg.provider.api_key.as_deref(), Some("abc"));
        assert_eq!(cfg.search.lookback_days, 14);
        // Other fields use defaults
        assert_eq!(cfg.search.limit, 20);
        assert_eq!(cfg.provider.timeout_secs, 30);
        assert_eq!(cfg.funnel.lookback_days, 30);
    }

    #[test]
    fn test_env_key_overrides_file() {
        let cfg = Config::from_toml("[provider]\napi_key = \"from-file\"\n")
            .expect("parse")
            .with_api_key(Some(" from-env ".into()));
        assert_eq!(cfg.provider.api_key.as_deref(), Some("from-env"));

        let cfg = Config::default().with_api_key(Some("   ".into()));
        assert!(cfg.provider.api_key.is_none());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(Config::from_toml("[search]\nlimit = \"many\"").is_err());
    }
}
