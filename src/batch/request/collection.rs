//! Auto-chunking collection of batch contents

use super::content::BatchRequestContent;
use crate::batch::{BatchRequestStep, MAX_REQUESTS, is_success_status_code};
use crate::error::{BatchError, Result};
use crate::http::{HttpRequest, IdGenerator, RequestConverter, RequestInformation, UuidIdGenerator};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Unbounded sequence of steps spread over as many physical batches as needed
///
/// Steps go to the current page until it holds `limit` steps; the next add seals it and
/// opens a fresh one. Dependencies must live on the same page as the dependent step.
/// [`get_pages_for_execution`](Self::get_pages_for_execution) turns the collection
/// read-only for good.
#[derive(Debug, Clone)]
pub struct BatchRequestContentCollection {
    sealed: Vec<BatchRequestContent>,
    current: BatchRequestContent,
    limit: usize,
    read_only: bool,
}

impl Default for BatchRequestContentCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchRequestContentCollection {
    /// Collection filling each page up to [`MAX_REQUESTS`]
    pub fn new() -> Self {
        Self::build(MAX_REQUESTS, Arc::new(UuidIdGenerator))
    }

    /// Collection sealing pages at `limit` steps, `2..=MAX_REQUESTS`
    pub fn with_limit(limit: usize) -> Result<Self> {
        Self::with_limit_and_id_generator(limit, Arc::new(UuidIdGenerator))
    }

    pub fn with_limit_and_id_generator(
        limit: usize,
        id_generator: Arc<dyn IdGenerator>,
    ) -> Result<Self> {
        if !(2..=MAX_REQUESTS).contains(&limit) {
            return Err(BatchError::invalid_argument(format!(
                "batch request limit must be between 2 and {}, got {}",
                MAX_REQUESTS, limit
            )));
        }
        Ok(Self::build(limit, id_generator))
    }

    fn build(limit: usize, id_generator: Arc<dyn IdGenerator>) -> Self {
        Self {
            sealed: Vec::new(),
            current: BatchRequestContent::with_id_generator(id_generator),
            limit,
            read_only: false,
        }
    }

    /// Add a step, sealing the current page first when it is full
    pub fn add_step(&mut self, step: BatchRequestStep) -> Result<()> {
        self.ensure_writable("add_step")?;

        if self.contains(step.id()) {
            return Err(BatchError::DuplicateStepId(step.id().to_string()));
        }

        if self.current.len() >= self.limit {
            // A fresh page cannot satisfy any dependency.
            if let Some(missing) = step.depends_on().first() {
                return Err(BatchError::invalid_dependency(step.id(), missing.as_str()));
            }
            self.seal_current();
        }

        self.current.add_step(step)
    }

    /// Wrap a raw request in a step with a fresh collection-wide id
    pub fn add_request(&mut self, request: HttpRequest) -> Result<String> {
        self.ensure_writable("add_request")?;
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
        self.ensure_writable("add_request_info")?;
        let request = converter.convert(info).await?;
        self.add_request(request)
    }

    /// Remove from the current page, then from sealed pages in order
    pub fn remove_step_by_id(&mut self, id: &str) -> Result<bool> {
        self.ensure_writable("remove_step_by_id")?;

        if self.current.remove_step_by_id(id) {
            return Ok(true);
        }
        Ok(self.sealed.iter_mut().any(|page| page.remove_step_by_id(id)))
    }

    /// Seal the current page and hand out every page; the collection is read-only afterwards
    pub fn get_pages_for_execution(&mut self) -> Vec<BatchRequestContent> {
        if !self.current.is_empty() {
            self.seal_current();
        }
        if !self.read_only {
            debug!(pages = self.sealed.len(), "Batch collection sealed for execution");
        }
        self.read_only = true;
        self.sealed.clone()
    }

    /// Steps of every page, keyed by id
    pub fn get_all_steps(&self) -> HashMap<&str, &BatchRequestStep> {
        self.pages()
            .flat_map(|page| page.steps().iter())
            .map(|step| (step.id(), step))
            .collect()
    }

    /// Fresh writable collection, same limit, holding every non-2xx step's original request
    pub fn build_failed_requests_collection(
        &self,
        status_by_id: &HashMap<String, u16>,
    ) -> Result<Self> {
        let mut retry = Self::build(self.limit, Arc::clone(self.current.id_generator()));

        for step in self.pages().flat_map(|page| page.steps().iter()) {
            let failed = status_by_id
                .get(step.id())
                .is_some_and(|status| !is_success_status_code(*status));
            if failed {
                retry.add_step(BatchRequestStep::new(step.id(), step.request().clone())?)?;
            }
        }

        debug!(failed = retry.len(), pages = retry.page_count(), "Built retry batch collection");
        Ok(retry)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.pages().any(|page| page.contains(id))
    }

    /// Steps across every page
    pub fn len(&self) -> usize {
        self.pages().map(BatchRequestContent::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sealed pages plus the current one when it holds steps
    pub fn page_count(&self) -> usize {
        self.sealed.len() + usize::from(!self.current.is_empty())
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn pages(&self) -> impl Iterator<Item = &BatchRequestContent> {
        self.sealed.iter().chain(std::iter::once(&self.current))
    }

    fn seal_current(&mut self) {
        let fresh = BatchRequestContent::with_id_generator(Arc::clone(self.current.id_generator()));
        let full = std::mem::replace(&mut self.current, fresh);
        debug!(steps = full.len(), page = self.sealed.len() + 1, "Sealed batch page");
        self.sealed.push(full);
    }

    fn ensure_writable(&self, operation: &str) -> Result<()> {
        if self.read_only {
            warn!(operation, "Rejected mutation of a batch collection already handed off");
            return Err(BatchError::read_only(operation));
        }
        Ok(())
    }

    fn fresh_id(&self) -> String {
        let generator = Arc::clone(self.current.id_generator());
        loop {
            let id = generator.next_id();
            if !self.contains(&id) {
                return id;
            }
        }
    }
}
