//! Network retrieval of raw SVG markup
//!
//! [`Fetcher::fetch`] never fails: any problem degrades to
//! [`FALLBACK_SVG`] so a missing icon renders empty instead of breaking the
//! page around it.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::LoaderConfig;
use crate::error::Result;
use crate::stats::LoadStats;
use crate::svg::{extract_svg, FALLBACK_SVG};

/// Status and body of a completed GET
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Response body; empty for non-success statuses
    pub body: String,
}

impl Response {
    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Why a GET produced no response
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The request could not be constructed (bad URI, unsupported scheme)
    #[error("invalid request: {0}")]
    Request(String),

    /// Connection, timeout, or body read failure
    #[error("network error: {0}")]
    Network(String),
}

/// Performs a single GET request
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET to `uri`
    async fn get(&self, uri: &str) -> std::result::Result<Response, TransportError>;
}

/// [`Transport`] backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a client honouring the configured timeout and user agent
    pub fn new(config: &LoaderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_builder() {
        TransportError::Request(err.to_string())
    } else {
        TransportError::Network(err.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, uri: &str) -> std::result::Result<Response, TransportError> {
        let response = self.client.get(uri).send().await.map_err(classify)?;
        let status = response.status();

        if !status.is_success() {
            return Ok(Response {
                status: status.as_u16(),
                body: String::new(),
            });
        }

        let body = response.text().await.map_err(classify)?;
        Ok(Response {
            status: status.as_u16(),
            body,
        })
    }
}

/// Fetches artifacts, substituting the fallback on any failure
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    stats: Arc<LoadStats>,
}

impl Fetcher {
    /// Create a fetcher over the given transport
    pub fn new(transport: Arc<dyn Transport>, stats: Arc<LoadStats>) -> Self {
        Self { transport, stats }
    }

    /// Retrieve the outer markup of the first `<svg>` served at `uri`
    pub async fn fetch(&self, uri: &str) -> String {
        self.stats.record_fetch();

        match self.transport.get(uri).await {
            Ok(response) if response.is_success() => match extract_svg(&response.body) {
                Some(svg) => {
                    debug!(uri, bytes = svg.len(), "fetched image");
                    svg.to_string()
                }
                None => {
                    warn!("Image at {} is not an SVG document", uri);
                    self.fallback()
                }
            },
            Ok(response) => {
                error!("Image at {} not found (status {})", uri, response.status);
                self.fallback()
            }
            Err(TransportError::Request(e)) => {
                info!("Image at {} not found: {}", uri, e);
                self.fallback()
            }
            Err(e) => {
                error!("Image at {} not found: {}", uri, e);
                self.fallback()
            }
        }
    }

    fn fallback(&self) -> String {
        self.stats.record_fallback();
        FALLBACK_SVG.to_string()
    }
}
