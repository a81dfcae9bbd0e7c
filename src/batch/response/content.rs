//! One physical batch response, demultiplexed per step id

use super::parser::{self, ParsedBatch, ParsedEntry};
use crate::batch::{BatchRequestContent, BatchResponseStep};
use crate::error::{BatchError, ErrorMapping, Result, ServiceError};
use crate::http::{HttpResponse, StepBody};
use bytes::Bytes;
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::warn;

/// Raw `$batch` response plus a parse-once view of its sub-responses
///
/// Every accessor reads the same memoized parse. The first caller parses, concurrent callers
/// wait for that result. Lookups of unknown ids return `Ok(None)`; an element that cannot be
/// rebuilt fails only the lookups that touch it.
#[derive(Debug)]
pub struct BatchResponseContent {
    response: HttpResponse,
    error_mapping: ErrorMapping,
    parsed: OnceCell<std::result::Result<ParsedBatch, String>>,
    parse_count: AtomicUsize,
}

impl BatchResponseContent {
    pub fn new(response: HttpResponse) -> Self {
        Self::with_error_mapping(response, ErrorMapping::default())
    }

    /// Wrap a response, converting error-shaped sub-responses through `error_mapping`
    pub fn with_error_mapping(response: HttpResponse, error_mapping: ErrorMapping) -> Self {
        Self {
            response,
            error_mapping,
            parsed: OnceCell::new(),
            parse_count: AtomicUsize::new(0),
        }
    }

    /// The physical response as received
    pub fn response(&self) -> &HttpResponse {
        &self.response
    }

    pub fn error_mapping(&self) -> &ErrorMapping {
        &self.error_mapping
    }

    /// How many times the payload has been parsed; never more than one
    pub fn parse_count(&self) -> usize {
        self.parse_count.load(Ordering::Acquire)
    }

    /// Raw response of every well-formed step
    ///
    /// Malformed elements are left out; [`get_by_id`](Self::get_by_id) reports them.
    pub fn get_all(&self) -> Result<HashMap<String, HttpResponse>> {
        Ok(self
            .readable_steps()?
            .map(|step| (step.id.clone(), step.to_http_response()))
            .collect())
    }

    /// Status of every well-formed step
    ///
    /// Malformed elements are left out, so a retry can still be built from the rest.
    pub fn get_all_status_codes(&self) -> Result<HashMap<String, u16>> {
        Ok(self
            .readable_steps()?
            .map(|step| (step.id.clone(), step.status))
            .collect())
    }

    /// Rebuilt sub-response for `id`
    pub fn get_step(&self, id: &str) -> Result<Option<&BatchResponseStep>> {
        match self.parsed()?.entry(id) {
            Some(entry) => step_of(entry).map(Some),
            None => Ok(None),
        }
    }

    /// Raw response for `id`
    pub fn get_by_id(&self, id: &str) -> Result<Option<HttpResponse>> {
        Ok(self.get_step(id)?.map(BatchResponseStep::to_http_response))
    }

    /// Decode the body of `id` with `decoder`
    ///
    /// An error-envelope body (`{"error":{..}}`) is never handed to the decoder; it becomes a
    /// service error run through the error mapping. A step without a body yields `Ok(None)`.
    pub fn get_by_id_typed<T, F>(&self, id: &str, decoder: F) -> Result<Option<T>>
    where
        F: FnOnce(&Value) -> Result<T>,
    {
        let Some(step) = self.get_step(id)? else {
            return Ok(None);
        };
        let Some(body) = &step.body else {
            return Ok(None);
        };

        if let StepBody::Json(value) = body {
            if let Some(error) = ServiceError::from_envelope(step.status, value) {
                return Err(self.error_mapping.map(error));
            }
            return decoder(value).map(Some);
        }

        decoder(&body.to_wire_value()?).map(Some)
    }

    /// Deserialize the body of `id` into `T`
    pub fn get_by_id_as<T: DeserializeOwned>(&self, id: &str) -> Result<Option<T>> {
        self.get_by_id_typed(id, |value| {
            T::deserialize(value).map_err(|source| BatchError::Decode {
                id: id.to_string(),
                source,
            })
        })
    }

    /// Body bytes of `id`, as a standalone response would carry them
    pub fn get_stream_by_id(&self, id: &str) -> Result<Option<Bytes>> {
        Ok(self.get_step(id)?.and_then(BatchResponseStep::body_bytes))
    }

    /// `@odata.nextLink` of the physical response
    pub fn get_next_link(&self) -> Result<Option<String>> {
        Ok(self.parsed()?.next_link.clone())
    }

    /// Step ids in wire order, malformed elements included
    pub fn ids(&self) -> Result<Vec<String>> {
        Ok(self
            .parsed()?
            .entries
            .iter()
            .map(|entry| entry.id.clone())
            .collect())
    }

    /// Retry content holding the steps of `request` that did not succeed here
    pub fn build_failed_requests_content(
        &self,
        request: &BatchRequestContent,
    ) -> Result<BatchRequestContent> {
        Ok(request.build_failed_requests_content(&self.get_all_status_codes()?))
    }

    /// True for 2xx status codes
    pub fn is_success_status_code(code: u16) -> bool {
        crate::batch::is_success_status_code(code)
    }

    fn readable_steps(&self) -> Result<impl Iterator<Item = &BatchResponseStep>> {
        Ok(self.parsed()?.entries.iter().filter_map(|entry| match &entry.step {
            Ok(step) => Some(step),
            Err(reason) => {
                warn!(step_id = %entry.id, reason = %reason, "Skipping malformed batch response element");
                None
            }
        }))
    }

    fn parsed(&self) -> Result<&ParsedBatch> {
        self.parsed
            .get_or_init(|| {
                self.parse_count.fetch_add(1, Ordering::AcqRel);
                parser::parse(&self.response.body).map_err(|e| match e {
                    BatchError::MalformedResponse(reason) => reason,
                    other => other.to_string(),
                })
            })
            .as_ref()
            .map_err(|reason| BatchError::malformed_response(reason.clone()))
    }
}

fn step_of(entry: &ParsedEntry) -> Result<&BatchResponseStep> {
    entry
        .step
        .as_ref()
        .map_err(|reason| BatchError::malformed_element(entry.id.as_str(), reason.as_str()))
}
