//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SHELLCACHE_*)
//! 2. TOML config file (if SHELLCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// App shell pre-cached on install.
const DEFAULT_PRECACHE: &[&str] = &[
    "/",
    "/index.html",
    "/legislation.html",
    "/know_your_rep.html",
    "/about.html",
    "/legislation_detail.html",
    "/styles/main.css",
    "/styles/themes.css",
    "/styles/about.css",
    "/styles/pumpkin-animation.css",
    "/scripts/main.js",
    "/scripts/filter.js",
    "/scripts/database.js",
    "/scripts/about.js",
    "/scripts/api-integration.js",
    "/manifest.json",
];

/// External API hosts the page talks to directly.
const DEFAULT_ALLOWLIST: &[&str] = &[
    "fonts.googleapis.com",
    "fonts.gstatic.com",
    "generativelanguage.googleapis.com",
    "api.openai.com",
];

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SHELLCACHE_*)
/// 2. TOML config file (if SHELLCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin of the site whose requests are intercepted.
    ///
    /// Set via SHELLCACHE_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Identifier of the current cache generation (e.g. a build hash).
    ///
    /// Set via SHELLCACHE_GENERATION environment variable.
    #[serde(default = "default_generation")]
    pub generation: String,

    /// Same-origin paths that must be cached on install.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    /// Hosts whose requests are passed through untouched.
    #[serde(default = "default_allowlist")]
    pub allowlist_domains: Vec<String>,

    /// Document served when a navigation fails offline.
    #[serde(default = "default_offline_url")]
    pub offline_url: String,

    /// Document served when the offline document is not cached either.
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,

    /// Path to SQLite cache database.
    ///
    /// Set via SHELLCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_generation() -> String {
    "mp-tracker-v1".into()
}

fn default_precache() -> Vec<String> {
    DEFAULT_PRECACHE.iter().map(|s| s.to_string()).collect()
}

fn default_allowlist() -> Vec<String> {
    DEFAULT_ALLOWLIST.iter().map(|s| s.to_string()).collect()
}

fn default_offline_url() -> String {
    "/offline.html".into()
}

fn default_fallback_url() -> String {
    "/index.html".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./shellcache.sqlite")
}

fn default_user_agent() -> String {
    "shellcache/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            generation: default_generation(),
            precache: default_precache(),
            allowlist_domains: default_allowlist(),
            offline_url: default_offline_url(),
            fallback_url: default_fallback_url(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SHELLCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SHELLCACHE_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.origin, "http://localhost:8080");
        assert_eq!(config.generation, "mp-tracker-v1");
        assert_eq!(config.precache.len(), 16);
        assert_eq!(config.precache[0], "/");
        assert_eq!(config.allowlist_domains.len(), 4);
        assert_eq!(config.offline_url, "/offline.html");
        assert_eq!(config.fallback_url, "/index.html");
        assert_eq!(config.db_path, PathBuf::from("./shellcache.sqlite"));
        assert_eq!(config.max_bytes, 5_242_880);
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_load_from_toml_and_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "shellcache.toml",
                r#"
                generation = "build-abc123"
                precache = ["/", "/offline.html"]
                "#,
            )?;
            jail.set_env("SHELLCACHE_CONFIG_FILE", "shellcache.toml");
            jail.set_env("SHELLCACHE_ORIGIN", "https://mp-tracker.example");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.generation, "build-abc123");
            assert_eq!(config.precache, vec!["/", "/offline.html"]);
            assert_eq!(config.origin, "https://mp-tracker.example");
            assert_eq!(config.fallback_url, "/index.html");
            Ok(())
        });
    }
}
