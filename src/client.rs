//! Batch poster
//!
//! Sends batch contents to the `$batch` endpoint through a [`RequestExecutor`] and wraps the
//! physical responses for per-step reading.

use crate::batch::{
    BatchRequestContent, BatchRequestContentCollection, BatchResponseContent,
    BatchResponseContentCollection,
};
use crate::config::BatchConfig;
use crate::error::{BatchError, ErrorMapping, Result, ServiceError};
use crate::http::{HttpResponse, RequestExecutor, ReqwestExecutor};
use futures::future::try_join_all;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Posts batch contents and collections
#[derive(Debug)]
pub struct BatchClient<E: RequestExecutor> {
    executor: E,
    config: BatchConfig,
    error_mapping: ErrorMapping,
}

impl BatchClient<ReqwestExecutor> {
    /// Client over a dedicated reqwest transport built from `config`
    pub fn from_config(config: BatchConfig) -> Result<Self> {
        config.validate()?;
        let executor = ReqwestExecutor::new(&config)?;
        Self::new(executor, config)
    }
}

impl<E: RequestExecutor> BatchClient<E> {
    pub fn new(executor: E, config: BatchConfig) -> Result<Self> {
        config.validate()?;
        info!(
            endpoint = %config.batch_endpoint(),
            limit = config.batch_request_limit,
            "BatchClient created"
        );
        Ok(Self {
            executor,
            config,
            error_mapping: ErrorMapping::default(),
        })
    }

    /// Mapping applied to error-shaped sub-responses and failed exchanges
    pub fn with_error_mapping(mut self, error_mapping: ErrorMapping) -> Self {
        self.error_mapping = error_mapping;
        self
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Empty collection paging at the configured limit
    pub fn new_collection(&self) -> Result<BatchRequestContentCollection> {
        BatchRequestContentCollection::with_limit(self.config.batch_request_limit)
    }

    /// Post one physical batch
    ///
    /// A non-2xx physical response fails as a whole; per-step failures are read from the
    /// returned content.
    pub async fn post_content(&self, content: &BatchRequestContent) -> Result<BatchResponseContent> {
        if content.is_empty() {
            return Err(BatchError::invalid_argument("cannot post an empty batch"));
        }

        let request = content.to_http_request(&self.config.batch_endpoint())?;
        debug!(steps = content.len(), "Posting batch");

        let response = self.executor.execute(request).await?;
        if !response.is_success() {
            warn!(status = response.status, "Batch exchange failed");
            return Err(self.error_mapping.map(exchange_error(&response)));
        }

        debug!(status = response.status, bytes = response.body.len(), "Batch answered");
        Ok(BatchResponseContent::with_error_mapping(
            response,
            self.error_mapping.clone(),
        ))
    }

    /// Seal `collection` and post every page concurrently
    ///
    /// The collection is read-only afterwards. Each page's response is keyed by the ids of
    /// that page; the first failing exchange fails the call.
    pub async fn post_collection(
        &self,
        collection: &mut BatchRequestContentCollection,
    ) -> Result<BatchResponseContentCollection> {
        let pages = collection.get_pages_for_execution();
        info!(pages = pages.len(), steps = collection.len(), "Posting batch collection");

        let contents = try_join_all(pages.iter().map(|page| self.post_content(page))).await?;

        let mut responses = BatchResponseContentCollection::new();
        for (page, content) in pages.iter().zip(contents) {
            responses.add_response(page.step_ids(), content);
        }
        Ok(responses)
    }
}

/// Service error for a failed physical exchange, from its error envelope when it has one
fn exchange_error(response: &HttpResponse) -> ServiceError {
    let body = serde_json::from_slice::<Value>(&response.body).unwrap_or_else(|_| {
        Value::String(String::from_utf8_lossy(&response.body).into_owned())
    });

    ServiceError::from_envelope(response.status, &body).unwrap_or_else(|| ServiceError {
        status: response.status,
        code: None,
        message: body.as_str().filter(|s| !s.is_empty()).map(str::to_string),
        inner_error: None,
        body,
    })
}
