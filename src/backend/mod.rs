//! Backend access with sequential fallback over several base URLs.
//!
//! The org graph / tasks backend can live in three places: an operator
//! override, the deployed instance, or a local dev server. Every request walks
//! that list in order and stops at the first usable answer:
//!
//! ```text
//!   BACKEND_URL ──▶ deployed ──▶ 127.0.0.1:8000 ──▶ BackendError::Exhausted
//!       │ 2xx / 4xx (not 404)  → returned as-is
//!       │ 404 / 5xx / timeout / connection error → recorded, next candidate
//! ```
//!
//! Each attempt has its own timeout; when it fires the attempt future is
//! dropped, which aborts the in-flight request.

mod error;
mod http;

pub use error::{BackendError, TransportError};
pub use http::HttpTransport;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::Config;

/// A request against a logical backend path such as `/api/tasks`.
#[derive(Debug, Clone)]
pub struct BackendRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
}

impl BackendRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn put(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::PUT,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// A fully-read backend response.
#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub status: StatusCode,
    pub body: String,
}

impl BackendResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// A decoded value together with the base URL that produced it.
#[derive(Debug, Clone)]
pub struct Located<T> {
    pub value: T,
    pub base_url: String,
}

/// Sends one request to one fully-qualified URL.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        url: &str,
        request: &BackendRequest,
        timeout: Duration,
    ) -> Result<BackendResponse, TransportError>;
}

/// Statuses that mean "this backend can't serve it, try the next one".
pub fn is_fallthrough_status(status: StatusCode) -> bool {
    status == StatusCode::NOT_FOUND || status.as_u16() >= 500
}

/// Normalize and deduplicate candidate base URLs, keeping first occurrence.
pub fn candidate_base_urls<'a, I>(candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut urls: Vec<String> = Vec::new();
    for candidate in candidates.into_iter().flatten() {
        let normalized = candidate.trim().trim_end_matches('/');
        if normalized.is_empty() || urls.iter().any(|u| u == normalized) {
            continue;
        }
        urls.push(normalized.to_string());
    }
    urls
}

/// Backend client that falls back across candidate base URLs.
#[derive(Clone)]
pub struct BackendClient {
    transport: Arc<dyn Transport>,
    base_urls: Vec<String>,
    timeout: Duration,
}

impl BackendClient {
    pub fn new(transport: Arc<dyn Transport>, base_urls: Vec<String>, timeout: Duration) -> Self {
        Self {
            transport,
            base_urls,
            timeout,
        }
    }

    /// HTTP client for the candidates named by `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(HttpTransport::new()),
            config.backend_candidates(),
            config.request_timeout,
        )
    }

    pub fn base_urls(&self) -> &[String] {
        &self.base_urls
    }

    async fn attempt(
        &self,
        url: &str,
        request: &BackendRequest,
    ) -> Result<BackendResponse, TransportError> {
        match tokio::time::timeout(self.timeout, self.transport.send(url, request, self.timeout))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(self.timeout)),
        }
    }

    /// Send `request`, falling back on 404, 5xx and transport failures.
    ///
    /// Any other non-success status is returned to the caller untouched.
    pub async fn fetch(&self, request: &BackendRequest) -> Result<BackendResponse, BackendError> {
        if self.base_urls.is_empty() {
            return Err(BackendError::NoCandidates);
        }

        let mut failures = Vec::new();
        for base_url in &self.base_urls {
            let url = format!("{}{}", base_url, request.path);
            match self.attempt(&url, request).await {
                Ok(response) if response.is_success() => {
                    tracing::debug!("{} {} -> {}", request.method, url, response.status);
                    return Ok(response);
                }
                Ok(response) if is_fallthrough_status(response.status) => {
                    tracing::warn!(
                        "{} {} -> HTTP {}, trying next backend",
                        request.method,
                        url,
                        response.status.as_u16()
                    );
                    failures.push(format!("{} -> HTTP {}", url, response.status.as_u16()));
                }
                Ok(response) => {
                    tracing::debug!(
                        "{} {} -> {} (returned without fallback)",
                        request.method,
                        url,
                        response.status
                    );
                    return Ok(response);
                }
                Err(e) => {
                    tracing::warn!("{} {} failed, trying next backend: {}", request.method, url, e);
                    failures.push(format!("{} -> {}", url, e));
                }
            }
        }

        tracing::error!(
            "All {} backends failed for {} {}",
            failures.len(),
            request.method,
            request.path
        );
        Err(BackendError::Exhausted { failures })
    }

    /// Send `request` to one base URL and decode the body as `T`.
    ///
    /// The error is the recorded failure reason for that candidate.
    pub async fn fetch_json_at<T: DeserializeOwned>(
        &self,
        base_url: &str,
        request: &BackendRequest,
    ) -> Result<T, String> {
        let url = format!("{}{}", base_url, request.path);
        match self.attempt(&url, request).await {
            Ok(response) if response.is_success() => response.json::<T>().map_err(|e| {
                tracing::warn!("{} returned an unreadable payload: {}", url, e);
                format!("{} -> Invalid payload: {}", url, e)
            }),
            Ok(response) => {
                tracing::warn!("{} -> HTTP {}", url, response.status.as_u16());
                Err(format!("{} -> HTTP {}", url, response.status.as_u16()))
            }
            Err(e) => {
                tracing::warn!("{} failed: {}", url, e);
                Err(format!("{} -> {}", url, e))
            }
        }
    }

    /// Send `request` and decode the body as `T`.
    ///
    /// Stricter than [`fetch`](Self::fetch): every non-success status and every
    /// undecodable body counts as a candidate failure.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: &BackendRequest,
    ) -> Result<Located<T>, BackendError> {
        if self.base_urls.is_empty() {
            return Err(BackendError::NoCandidates);
        }

        let mut failures = Vec::new();
        for base_url in &self.base_urls {
            match self.fetch_json_at::<T>(base_url, request).await {
                Ok(value) => {
                    return Ok(Located {
                        value,
                        base_url: base_url.clone(),
                    })
                }
                Err(reason) => failures.push(reason),
            }
        }

        tracing::error!("All backends failed for {}", request.path);
        Err(BackendError::Exhausted { failures })
    }
}
