//! Configuration validation rules.
//!
//! Checks `AppConfig` values after loading and resolves the site paths into
//! the absolute URLs the controller works with.

use crate::config::AppConfig;
use crate::worker::WorkerConfig;
use thiserror::Error;
use url::Url;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `origin` is not a bare http(s) origin
    /// - `generation` is empty
    /// - a precache entry or fallback document is not same-origin
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        let config = self.worker_config()?;

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if !config.precache.contains(&config.offline_url) {
            tracing::warn!(
                offline_url = %config.offline_url,
                "offline document is not pre-cached; failed navigations fall back to {}",
                config.fallback_url
            );
        }

        Ok(())
    }

    /// Origin parsed and checked to carry no path, query or fragment.
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        let origin = Url::parse(self.origin.trim()).map_err(|e| invalid("origin", e.to_string()))?;

        if !matches!(origin.scheme(), "http" | "https") {
            return Err(invalid("origin", format!("unsupported scheme: {}", origin.scheme())));
        }
        if origin.host_str().is_none() {
            return Err(invalid("origin", "must include a host"));
        }
        if origin.path() != "/" || origin.query().is_some() || origin.fragment().is_some() {
            return Err(invalid("origin", "must not include a path, query or fragment"));
        }

        Ok(origin)
    }

    /// Build the controller configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for any value the controller cannot use.
    pub fn worker_config(&self) -> Result<WorkerConfig, ConfigError> {
        let origin = self.origin_url()?;

        let generation = self.generation.trim();
        if generation.is_empty() {
            return Err(invalid("generation", "must not be empty"));
        }

        let precache = self
            .precache
            .iter()
            .map(|path| same_origin(&origin, "precache", path))
            .collect::<Result<Vec<_>, _>>()?;

        let allowlist = self
            .allowlist_domains
            .iter()
            .map(|d| d.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect();

        Ok(WorkerConfig {
            offline_url: same_origin(&origin, "offline_url", &self.offline_url)?,
            fallback_url: same_origin(&origin, "fallback_url", &self.fallback_url)?,
            origin,
            generation: generation.to_string(),
            precache,
            allowlist,
        })
    }
}

fn same_origin(origin: &Url, field: &str, path: &str) -> Result<Url, ConfigError> {
    let mut url = origin
        .join(path.trim())
        .map_err(|e| invalid(field, format!("{path}: {e}")))?;
    url.set_fragment(None);

    if url.origin() != origin.origin() {
        return Err(invalid(field, format!("{path} is not on {}", origin.origin().ascii_serialization())));
    }

    Ok(url)
}
