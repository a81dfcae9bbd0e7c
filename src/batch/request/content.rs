//! One physical batch: an id-keyed, insertion-ordered, capacity-bounded set of steps

use super::serializer::{WirePayload, WireRequest};
use crate::batch::{BatchRequestStep, MAX_REQUESTS, is_success_status_code};
use crate::error::{BatchError, Result};
use crate::http::{
    APPLICATION_JSON, CONTENT_TYPE, HttpRequest, IdGenerator, RequestConverter,
    RequestInformation, StepBody, UuidIdGenerator,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Steps of one `$batch` exchange
///
/// Every add path validates eagerly: ids are unique, the content never holds more than
/// [`MAX_REQUESTS`] steps, and each `dependsOn` id must name a step already present.
#[derive(Debug, Clone)]
pub struct BatchRequestContent {
    steps: Vec<BatchRequestStep>,
    id_generator: Arc<dyn IdGenerator>,
}

impl Default for BatchRequestContent {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchRequestContent {
    /// Create an empty content with random step ids
    pub fn new() -> Self {
        Self::with_id_generator(Arc::new(UuidIdGenerator))
    }

    pub fn with_id_generator(id_generator: Arc<dyn IdGenerator>) -> Self {
        Self {
            steps: Vec::new(),
            id_generator,
        }
    }

    /// Build from steps in order
    ///
    /// Each step's dependencies must appear earlier in `steps`. Any violation fails the
    /// whole construction.
    pub fn from_steps<I>(steps: I) -> Result<Self>
    where
        I: IntoIterator<Item = BatchRequestStep>,
    {
        let mut content = Self::new();
        for step in steps {
            content.add_step(step)?;
        }
        Ok(content)
    }

    /// Add a step
    ///
    /// Fails on a duplicate id, when the content is full, or when a dependency is unknown.
    pub fn add_step(&mut self, step: BatchRequestStep) -> Result<()> {
        if self.contains(step.id()) {
            return Err(BatchError::DuplicateStepId(step.id().to_string()));
        }
        if self.is_full() {
            return Err(BatchError::capacity_exceeded(MAX_REQUESTS, self.steps.len() + 1));
        }
        if let Some(missing) = step.depends_on().iter().find(|dep| !self.contains(dep)) {
            return Err(BatchError::invalid_dependency(step.id(), missing.as_str()));
        }

        debug!(step_id = step.id(), depends_on = ?step.depends_on(), "Adding batch step");
        self.steps.push(step);
        Ok(())
    }

    /// Wrap a raw request in a step with a fresh id
    pub fn add_request(&mut self, request: HttpRequest) -> Result<String> {
        if self.is_full() {
            return Err(BatchError::capacity_exceeded(MAX_REQUESTS, self.steps.len() + 1));
        }
        let id = self.fresh_id();
        self.add_step(BatchRequestStep::new(id.clone(), request)?)?;
        Ok(id)
    }

    /// Convert a request description, then add it under a fresh id
    pub async fn add_request_info<C>(
        &mut self,
        converter: &C,
        info: RequestInformation,
    ) -> Result<String>
    where
        C: RequestConverter + ?Sized,
    {
        if self.is_full() {
            return Err(BatchError::capacity_exceeded(MAX_REQUESTS, self.steps.len() + 1));
        }
        let request = converter.convert(info).await?;
        self.add_request(request)
    }

    /// Remove a step and scrub its id from every remaining `dependsOn`
    ///
    /// Returns whether the step was present; scrubbing happens either way.
    pub fn remove_step_by_id(&mut self, id: &str) -> bool {
        let before = self.steps.len();
        self.steps.retain(|step| step.id() != id);
        let removed = self.steps.len() != before;

        let scrubbed: usize = self
            .steps
            .iter_mut()
            .map(|step| step.remove_dependency(id))
            .sum();

        debug!(step_id = id, removed, scrubbed, "Removed batch step");
        removed
    }

    /// Retry batch holding the original request of every step whose status is not 2xx
    ///
    /// Steps keep their ids; dependencies are not carried over.
    pub fn build_failed_requests_content(&self, status_by_id: &HashMap<String, u16>) -> Self {
        let mut retry = Self::with_id_generator(Arc::clone(&self.id_generator));
        retry.steps = self
            .steps
            .iter()
            .filter(|step| {
                status_by_id
                    .get(step.id())
                    .is_some_and(|status| !is_success_status_code(*status))
            })
            .filter_map(|step| BatchRequestStep::new(step.id(), step.request().clone()).ok())
            .collect();

        debug!(failed = retry.steps.len(), "Built retry batch content");
        retry
    }

    pub fn get_step(&self, id: &str) -> Option<&BatchRequestStep> {
        self.steps.iter().find(|step| step.id() == id)
    }

    /// Steps in insertion order
    pub fn steps(&self) -> &[BatchRequestStep] {
        &self.steps
    }

    pub fn step_ids(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(BatchRequestStep::id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.steps.iter().any(|step| step.id() == id)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.steps.len() >= MAX_REQUESTS
    }

    pub(crate) fn id_generator(&self) -> &Arc<dyn IdGenerator> {
        &self.id_generator
    }

    /// Payload as a JSON value
    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.wire_payload()?)?)
    }

    /// Payload bytes, steps in insertion order
    pub fn serialize(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.wire_payload()?)?)
    }

    /// POST of the payload to `batch_endpoint`
    pub fn to_http_request(&self, batch_endpoint: &str) -> Result<HttpRequest> {
        let payload = self.serialize()?;
        Ok(HttpRequest::post(batch_endpoint, StepBody::bytes(payload, APPLICATION_JSON))?
            .with_header(CONTENT_TYPE, APPLICATION_JSON))
    }

    fn wire_payload(&self) -> Result<WirePayload<'_>> {
        Ok(WirePayload {
            requests: self
                .steps
                .iter()
                .map(WireRequest::from_step)
                .collect::<Result<_>>()?,
        })
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = self.id_generator.next_id();
            if !self.contains(&id) {
                return id;
            }
        }
    }
}
