//! Site configuration (TOML file plus environment overrides)

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{CatalogError, Result};
use crate::preload::DEFAULT_PRELOAD_CAP;
use crate::view::DEFAULT_PAGE_SIZE;

pub const ENV_REMOTE_URL: &str = "SUPABASE_URL";
pub const ENV_REMOTE_KEY: &str = "SUPABASE_ANON_KEY";

/// Remote REST backend credentials
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
}

impl RemoteConfig {
    /// Both the project URL and the anonymous key are present
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.anon_key.trim().is_empty()
    }

    /// Fail with a configuration error if credentials are missing
    pub fn require(&self) -> Result<&Self> {
        if self.is_configured() {
            Ok(self)
        } else {
            Err(CatalogError::Configuration(format!(
                "{} and {} must both be set",
                ENV_REMOTE_URL, ENV_REMOTE_KEY
            )))
        }
    }
}

fn default_preload_cap() -> usize {
    DEFAULT_PRELOAD_CAP
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_fetch_timeout() -> u64 {
    15
}

fn default_probe_timeout() -> u64 {
    5
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Where the static `games.json` / `posts.json` snapshot is served from
    #[serde(default)]
    pub snapshot_base_url: Option<String>,
    #[serde(default = "default_preload_cap")]
    pub preload_cap: usize,
    /// Grid page size; 0 shows everything on one page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::default(),
            snapshot_base_url: None,
            preload_cap: DEFAULT_PRELOAD_CAP,
            page_size: DEFAULT_PAGE_SIZE,
            fetch_timeout_secs: default_fetch_timeout(),
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}

impl SiteConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| CatalogError::Configuration(format!("invalid config: {}", e)))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CatalogError::Configuration(e.to_string()))
    }

    /// Apply overrides from a variable lookup (normally `std::env::var`)
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_REMOTE_URL).filter(|v| !v.trim().is_empty()) {
            self.remote.url = url;
        }
        if let Some(key) = lookup(ENV_REMOTE_KEY).filter(|v| !v.trim().is_empty()) {
            self.remote.anon_key = key;
        }
    }

    /// Apply overrides from the process environment
    pub fn with_process_env(mut self) -> Self {
        self.apply_env(|name| std::env::var(name).ok());
        self
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config = SiteConfig::from_toml_str("").unwrap();
        assert_eq!(config, SiteConfig::default());
        assert_eq!(config.preload_cap, 3);
        assert_eq!(config.page_size, 24);
        assert!(!config.remote.is_configured());
    }

    #[test]
    fn test_partial_file() {
        let config = SiteConfig::from_toml_str(
            r#"
            page_size = 0
            snapshot_base_url = "https://arcade.example.com/api"

            [remote]
            url = "https://abc.supabase.co"
            anon_key = "public-key"
            "#,
        )
        .unwrap();
        assert_eq!(config.page_size, 0);
        assert_eq!(config.fetch_timeout_secs, 15);
        assert!(config.remote.is_configured());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = SiteConfig::default();
        config.remote.url = "https://file.example.com".to_string();
        config.apply_env(|name| match name {
            ENV_REMOTE_URL => Some("https://env.example.com".to_string()),
            ENV_REMOTE_KEY => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.remote.url, "https://env.example.com");
        assert!(config.remote.anon_key.is_empty());
        assert!(matches!(config.remote.require(), Err(CatalogError::Configuration(_))));
    }

    #[test]
    fn test_invalid_toml_is_configuration_error() {
        assert!(matches!(
            SiteConfig::from_toml_str("page_size = \"many\""),
            Err(CatalogError::Configuration(_))
        ));
    }
}
