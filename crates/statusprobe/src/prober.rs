//! Server prober implementations.

use crate::types::ServerStatus;
use async_trait::async_trait;
use reqwest::Url;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while probing a server.
///
/// Each variant is a distinct failure kind; none of them carries a partial
/// status record.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid request for {endpoint}: {reason}")]
    InvalidRequest { endpoint: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read response body from {endpoint}: {source}")]
    Body {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode status payload from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ProbeError {
    /// Short name of the failure kind, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeError::InvalidRequest { .. } => "invalid_request",
            ProbeError::Client(_) => "client",
            ProbeError::Transport { .. } => "transport",
            ProbeError::Body { .. } => "body",
            ProbeError::Decode { .. } => "decode",
        }
    }
}

/// Server prober trait
#[async_trait]
pub trait ServerProber: Send + Sync {
    /// Poll `endpoint` once and decode its status payload
    async fn query(&self, endpoint: &str) -> Result<ServerStatus, ProbeError>;
}

/// HTTP prober backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    /// Create a prober that relies on the transport's default timeouts
    pub fn new() -> Result<Self, ProbeError> {
        Self::with_timeout(None)
    }

    /// Create a prober with an optional whole-request timeout
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, ProbeError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ProbeError::Client)?;

        Ok(Self { client })
    }

    fn parse_endpoint(endpoint: &str) -> Result<Url, ProbeError> {
        let url = Url::parse(endpoint).map_err(|e| ProbeError::InvalidRequest {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ProbeError::InvalidRequest {
                endpoint: endpoint.to_string(),
                reason: format!("unsupported scheme: {}", other),
            }),
        }
    }
}

#[async_trait]
impl ServerProber for HttpProber {
    async fn query(&self, endpoint: &str) -> Result<ServerStatus, ProbeError> {
        let url = Self::parse_endpoint(endpoint)?;
        let request = self
            .client
            .get(url)
            .build()
            .map_err(|e| ProbeError::InvalidRequest {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        let start = Instant::now();

        let response = self.client.execute(request).await.map_err(|source| {
            warn!(endpoint = %endpoint, error = %source, "Status request failed");
            ProbeError::Transport {
                endpoint: endpoint.to_string(),
                source,
            }
        })?;
        let http_status = response.status().as_u16();

        let body = response.bytes().await.map_err(|source| ProbeError::Body {
            endpoint: endpoint.to_string(),
            source,
        })?;
        let latency = start.elapsed();

        let mut status = ServerStatus::from_json(&body).map_err(|source| {
            warn!(endpoint = %endpoint, error = %source, "Status payload is not valid JSON");
            ProbeError::Decode {
                endpoint: endpoint.to_string(),
                source,
            }
        })?;
        status.latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);

        debug!(
            endpoint = %endpoint,
            http_status,
            status = status.status_code,
            latency_ms = status.latency_ms,
            "Status query successful"
        );

        Ok(status)
    }
}
