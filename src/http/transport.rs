//! reqwest-backed transport
//!
//! A process-wide client is shared by every executor built from the default configuration,
//! so connection pools and DNS caches are reused across batches.

use super::body::StepBody;
use super::traits::RequestExecutor;
use super::types::{CONTENT_TYPE, Headers, HttpRequest, HttpResponse};
use crate::config::BatchConfig;
use crate::error::{BatchError, Result};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, warn};

/// Shared HTTP client instance
static SHARED_HTTP_CLIENT: OnceCell<Client> = OnceCell::new();

/// Get the shared HTTP client instance, built from the default configuration
pub fn shared_client() -> &'static Client {
    SHARED_HTTP_CLIENT.get_or_init(|| {
        debug!("Initializing shared HTTP client");
        build_client(&BatchConfig::default()).unwrap_or_else(|e| {
            warn!("Failed to create configured HTTP client, falling back to default: {}", e);
            Client::new()
        })
    })
}

fn build_client(config: &BatchConfig) -> Result<Client> {
    Ok(ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_nodelay(true)
        .user_agent(config.user_agent.clone())
        .build()?)
}

/// Executes wire-ready requests with reqwest
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    client: Client,
}

impl ReqwestExecutor {
    /// Dedicated client honoring `config`'s timeout and user agent
    pub fn new(config: &BatchConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestExecutor {
    fn default() -> Self {
        Self::with_client(shared_client().clone())
    }
}

#[async_trait]
impl RequestExecutor for ReqwestExecutor {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(method = %request.method, url = %request.url, "Executing request");

        let content_type = request.content_type().map(str::to_string);
        let mut builder = self.client.request(request.method, request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = request.body.as_ref() {
            if request.headers.keys().all(|k| !k.eq_ignore_ascii_case(CONTENT_TYPE)) {
                if let Some(content_type) = content_type {
                    builder = builder.header(CONTENT_TYPE, content_type);
                }
            }
            builder = builder.body(StepBody::to_bytes(body));
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                BatchError::transport(e.to_string())
            } else {
                BatchError::HttpClient(e)
            }
        })?;

        let status = response.status().as_u16();
        let mut headers = Headers::new();
        for (name, value) in response.headers() {
            match value.to_str() {
                Ok(value) => {
                    headers.insert(name.as_str().to_string(), value.to_string());
                }
                Err(_) => warn!(header = %name, "Dropping non-ASCII response header"),
            }
        }
        let body = response.bytes().await?;

        debug!(status, bytes = body.len(), "Received response");
        Ok(HttpResponse::new(status, headers, body))
    }
}
