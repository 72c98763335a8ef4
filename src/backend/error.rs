//! Error types for backend access.

use std::time::Duration;

use thiserror::Error;

/// Failure of a single attempt against one base URL.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

/// Failure of a whole fallback pass.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("No backend base URLs configured")]
    NoCandidates,

    /// Every candidate failed; one entry per candidate, in attempt order.
    #[error("All backends failed. {}", .failures.join(" | "))]
    Exhausted { failures: Vec<String> },
}

impl BackendError {
    /// Per-candidate failure reasons.
    pub fn failures(&self) -> &[String] {
        match self {
            BackendError::NoCandidates => &[],
            BackendError::Exhausted { failures } => failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_message_lists_every_failure() {
        let err = BackendError::Exhausted {
            failures: vec![
                "http://a/api/tasks -> HTTP 503".to_string(),
                "http://b/api/tasks -> Connection failed: refused".to_string(),
            ],
        };
        assert_eq!(
            err.to_string(),
            "All backends failed. http://a/api/tasks -> HTTP 503 | http://b/api/tasks -> Connection failed: refused"
        );
        assert_eq!(err.failures().len(), 2);
    }

    #[test]
    fn test_timeout_display() {
        let err = TransportError::Timeout(Duration::from_millis(7000));
        assert_eq!(err.to_string(), "Request timed out after 7000ms");
    }
}
