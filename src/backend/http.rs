//! reqwest-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::error::TransportError;
use super::{BackendRequest, BackendResponse, Transport};

/// Sends backend requests over HTTP with a shared connection pool.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        url: &str,
        request: &BackendRequest,
        timeout: Duration,
    ) -> Result<BackendResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .header("Accept", "application/json")
            .timeout(timeout);

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(timeout)
            } else {
                TransportError::from(e)
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(timeout)
            } else {
                TransportError::Request(format!("Failed to read body: {}", e))
            }
        })?;

        Ok(BackendResponse { status, body })
    }
}
