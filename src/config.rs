//! Runtime configuration.
//!
//! Everything is read once from the environment at startup:
//! - `BACKEND_URL` - operator override, tried before the built-in backends
//! - `HOST` / `PORT` - listen address (defaults `0.0.0.0:3000`)
//! - `BACKEND_TIMEOUT_MS` - per-attempt backend timeout (default 7000)

use std::time::Duration;

use thiserror::Error;

/// Deployed backend, tried after the operator override.
pub const DEPLOYED_BACKEND_URL: &str = "https://hacknation-openai-challenge.onrender.com";

/// Local development backend.
pub const LOCAL_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Per-attempt timeout for backend requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(7_000);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid BACKEND_URL {value:?}: {reason}")]
    InvalidBackendUrl { value: String, reason: String },

    #[error("Invalid {name} value {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Operator-configured backend, if any.
    pub backend_url: Option<String>,
    pub deployed_backend_url: String,
    pub local_backend_url: String,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            backend_url: None,
            deployed_backend_url: DEPLOYED_BACKEND_URL.to_string(),
            local_backend_url: LOCAL_BACKEND_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(raw) = lookup("BACKEND_URL") {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                let parsed =
                    url::Url::parse(trimmed).map_err(|e| ConfigError::InvalidBackendUrl {
                        value: trimmed.to_string(),
                        reason: e.to_string(),
                    })?;
                if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
                    return Err(ConfigError::InvalidBackendUrl {
                        value: trimmed.to_string(),
                        reason: "expected an http:// or https:// URL with a host".to_string(),
                    });
                }
                config.backend_url = Some(trimmed.to_string());
            }
        }

        if let Some(host) = lookup("HOST").filter(|h| !h.trim().is_empty()) {
            config.host = host.trim().to_string();
        }

        if let Some(port) = lookup("PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber {
                    name: "PORT",
                    value: port.clone(),
                })?;
        }

        if let Some(ms) = lookup("BACKEND_TIMEOUT_MS") {
            let parsed: u64 = ms
                .trim()
                .parse()
                .ok()
                .filter(|millis| *millis > 0)
                .ok_or_else(|| ConfigError::InvalidNumber {
                    name: "BACKEND_TIMEOUT_MS",
                    value: ms.clone(),
                })?;
            config.request_timeout = Duration::from_millis(parsed);
        }

        Ok(config)
    }

    /// Candidate backend base URLs in the order they should be tried.
    pub fn backend_candidates(&self) -> Vec<String> {
        crate::backend::candidate_base_urls([
            self.backend_url.as_deref(),
            Some(self.deployed_backend_url.as_str()),
            Some(self.local_backend_url.as_str()),
        ])
    }
}
