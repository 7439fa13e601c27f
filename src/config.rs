// src/config.rs
// =============================================================================
// Host configuration.
//
// Everything the mediator and the status cache need comes from one TOML file
// with two tables:
//
//   [mediation]                      [status]
//   enable = true                    endpoint = "https://.../result.json"
//   enable_base64_encode = true      cache_key = "statusTagsData"
//   countdown_seconds = 4            freshness_minutes = 30
//   dark_mode = "auto"               request_timeout_secs = 10
//   trusted_domains = ["github.com"] cache_dir = "/var/cache/linkgate"
//   ignore_attributes = [...]
//
// Every field has a default, so an empty file (or no file) is valid.
//
// Rust concepts:
// - serde(default): fill missing fields from Default::default()
// - serde(try_from): accept two TOML shapes ("auto" or a bool) for one field
// =============================================================================

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the partner-link prober publishes its results
pub const DEFAULT_STATUS_ENDPOINT: &str = "https://check-flink.mcyzsx.top/result.json";

/// Key of the persisted cache envelope
pub const DEFAULT_CACHE_KEY: &str = "statusTagsData";

/// Longest freshness window we accept: one week
pub const MAX_FRESHNESS_MINUTES: u64 = 7 * 24 * 60;

/// Longest HTTP timeout we accept: five minutes
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    pub mediation: MediationConfig,
    pub status: StatusConfig,
}

/// Settings for the outbound-link mediator and the redirect page it feeds
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediationConfig {
    pub enable: bool,
    pub enable_base64_encode: bool,
    /// Seconds the redirect page waits before navigating
    pub countdown_seconds: u32,
    pub dark_mode: DarkMode,
    pub trusted_domains: BTreeSet<String>,
    pub ignore_attributes: BTreeSet<String>,
}

impl Default for MediationConfig {
    fn default() -> Self {
        Self {
            enable: true,
            enable_base64_encode: true,
            countdown_seconds: 4,
            dark_mode: DarkMode::Auto,
            trusted_domains: BTreeSet::new(),
            ignore_attributes: ["data-fancybox", "data-nolink"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Dark mode preference for the redirect page.
///
/// In TOML this is either the string "auto" or a boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DarkModeRepr", into = "DarkModeRepr")]
pub enum DarkMode {
    Auto,
    On,
    Off,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DarkModeRepr {
    Flag(bool),
    Keyword(String),
}

impl TryFrom<DarkModeRepr> for DarkMode {
    type Error = String;

    fn try_from(repr: DarkModeRepr) -> Result<Self, Self::Error> {
        match repr {
            DarkModeRepr::Flag(true) => Ok(DarkMode::On),
            DarkModeRepr::Flag(false) => Ok(DarkMode::Off),
            DarkModeRepr::Keyword(word) if word.eq_ignore_ascii_case("auto") => Ok(DarkMode::Auto),
            DarkModeRepr::Keyword(word) => {
                Err(format!("dark_mode must be \"auto\" or a boolean, got \"{}\"", word))
            }
        }
    }
}

impl From<DarkMode> for DarkModeRepr {
    fn from(mode: DarkMode) -> Self {
        match mode {
            DarkMode::Auto => DarkModeRepr::Keyword("auto".to_string()),
            DarkMode::On => DarkModeRepr::Flag(true),
            DarkMode::Off => DarkModeRepr::Flag(false),
        }
    }
}

/// Settings for the partner-link status cache
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatusConfig {
    pub endpoint: String,
    pub cache_key: String,
    pub freshness_minutes: u64,
    pub request_timeout_secs: u64,
    /// Directory for the persisted envelope; the platform cache dir when unset
    pub cache_dir: Option<PathBuf>,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_STATUS_ENDPOINT.to_string(),
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            freshness_minutes: 30,
            request_timeout_secs: 10,
            cache_dir: None,
        }
    }
}

impl StatusConfig {
    // validate() bounds freshness_minutes; saturating keeps an unvalidated
    // config from overflowing
    pub fn freshness_window(&self) -> Duration {
        Duration::from_secs(self.freshness_minutes.saturating_mul(60))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Resolves the cache directory, falling back to `<platform cache>/linkgate`
    pub fn resolved_cache_dir(&self) -> PathBuf {
        match &self.cache_dir {
            Some(dir) => dir.clone(),
            None => dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("linkgate"),
        }
    }
}

impl HostConfig {
    /// Loads the config from `path`, or returns the defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let mut config: HostConfig = toml::from_str(source)?;
        config.mediation.normalize();
        Ok(config)
    }

    // Checks values serde cannot check on its own
    //
    // Rules:
    //   status.endpoint / status.cache_key: not blank
    //   status.freshness_minutes: 1..=MAX_FRESHNESS_MINUTES
    //   status.request_timeout_secs: 1..=MAX_REQUEST_TIMEOUT_SECS
    //   mediation.trusted_domains: no empty entries
    //
    // Returns: the first violation as ConfigError::InvalidValue
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.status.endpoint.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "status.endpoint",
                reason: "must not be empty".to_string(),
            });
        }
        if self.status.cache_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "status.cache_key",
                reason: "must not be empty".to_string(),
            });
        }
        if self.status.freshness_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "status.freshness_minutes",
                reason: "must be > 0".to_string(),
            });
        }
        if self.status.freshness_minutes > MAX_FRESHNESS_MINUTES {
            return Err(ConfigError::InvalidValue {
                field: "status.freshness_minutes",
                reason: format!("must be <= {}", MAX_FRESHNESS_MINUTES),
            });
        }
        if self.status.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "status.request_timeout_secs",
                reason: "must be > 0".to_string(),
            });
        }
        if self.status.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(ConfigError::InvalidValue {
                field: "status.request_timeout_secs",
                reason: format!("must be <= {}", MAX_REQUEST_TIMEOUT_SECS),
            });
        }
        if self.mediation.trusted_domains.iter().any(|d| d.is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "mediation.trusted_domains",
                reason: "entries must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

impl MediationConfig {
    /// Lowercases trusted domains and strips a leading '.' so "Example.COM"
    /// and ".example.com" both match hosts the url crate hands back
    pub fn normalize(&mut self) {
        self.trusted_domains = self
            .trusted_domains
            .iter()
            .map(|d| d.trim().trim_start_matches('.').to_ascii_lowercase())
            .collect();
    }

    /// Convenience for callers that build a config in code
    pub fn with_trusted_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trusted_domains = domains.into_iter().map(Into::into).collect();
        self.normalize();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = HostConfig::default();
        assert!(config.mediation.enable);
        assert!(config.mediation.enable_base64_encode);
        assert_eq!(config.mediation.countdown_seconds, 4);
        assert_eq!(config.mediation.dark_mode, DarkMode::Auto);
        assert!(config.mediation.trusted_domains.is_empty());
        assert!(config.mediation.ignore_attributes.contains("data-fancybox"));
        assert!(config.mediation.ignore_attributes.contains("data-nolink"));
        assert_eq!(config.status.freshness_window(), Duration::from_secs(1800));
        assert_eq!(config.status.cache_key, "statusTagsData");
    }

    #[test]
    fn test_empty_file_is_valid() {
        let config = HostConfig::from_toml("").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.mediation, MediationConfig::default());
    }

    #[test]
    fn test_dark_mode_accepts_keyword_and_bool() {
        let auto = HostConfig::from_toml("[mediation]\ndark_mode = \"auto\"").unwrap();
        assert_eq!(auto.mediation.dark_mode, DarkMode::Auto);

        let on = HostConfig::from_toml("[mediation]\ndark_mode = true").unwrap();
        assert_eq!(on.mediation.dark_mode, DarkMode::On);

        let off = HostConfig::from_toml("[mediation]\ndark_mode = false").unwrap();
        assert_eq!(off.mediation.dark_mode, DarkMode::Off);

        assert!(HostConfig::from_toml("[mediation]\ndark_mode = \"dim\"").is_err());
    }

    #[test]
    fn test_trusted_domains_are_normalized() {
        let config = HostConfig::from_toml(
            "[mediation]\ntrusted_domains = [\"GitHub.com\", \".zsxcoder.top\"]",
        )
        .unwrap();
        assert!(config.mediation.trusted_domains.contains("github.com"));
        assert!(config.mediation.trusted_domains.contains("zsxcoder.top"));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(HostConfig::from_toml("[mediation]\ncountdowntime = 4").is_err());
    }

    #[test]
    fn test_zero_freshness_is_invalid() {
        let config = HostConfig::from_toml("[status]\nfreshness_minutes = 0").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "status.freshness_minutes", .. })
        ));
    }

    #[test]
    fn test_huge_freshness_is_rejected() {
        let config = HostConfig::from_toml("[status]\nfreshness_minutes = 9223372036854775807").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "status.freshness_minutes", .. })
        ));
        // Even unvalidated, computing the window does not overflow
        assert_eq!(config.status.freshness_window(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_freshness_upper_bound_is_inclusive() {
        let at_max = HostConfig::from_toml("[status]\nfreshness_minutes = 10080").unwrap();
        assert!(at_max.validate().is_ok());

        let above = HostConfig::from_toml("[status]\nfreshness_minutes = 10081").unwrap();
        assert!(above.validate().is_err());
    }

    #[test]
    fn test_huge_request_timeout_is_rejected() {
        let config = HostConfig::from_toml("[status]\nrequest_timeout_secs = 9223372036854775807").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "status.request_timeout_secs", .. })
        ));
    }
}
