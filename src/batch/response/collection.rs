//! Responses of a batch that was split across several physical exchanges

use super::content::BatchResponseContent;
use crate::error::Result;
use crate::http::HttpResponse;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// One physical response and the step ids it answers
#[derive(Debug)]
pub struct KeyedBatchResponseContent {
    keys: HashSet<String>,
    response: BatchResponseContent,
}

impl KeyedBatchResponseContent {
    pub fn new<I, S>(keys: I, response: BatchResponseContent) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            response,
        }
    }

    pub fn keys(&self) -> &HashSet<String> {
        &self.keys
    }

    pub fn response(&self) -> &BatchResponseContent {
        &self.response
    }

    pub fn contains(&self, id: &str) -> bool {
        self.keys.contains(id)
    }
}

/// Resolves any step id of a logical batch to the physical response that answered it
///
/// An id no response was registered for resolves to `Ok(None)`.
#[derive(Debug, Default)]
pub struct BatchResponseContentCollection {
    responses: Vec<KeyedBatchResponseContent>,
}

impl BatchResponseContentCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `content` answers the steps in `keys`
    pub fn add_response<I, S>(&mut self, keys: I, content: BatchResponseContent)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.responses.push(KeyedBatchResponseContent::new(keys, content));
    }

    /// Physical response owning `id`, first registered wins
    pub fn response_for(&self, id: &str) -> Option<&BatchResponseContent> {
        self.responses
            .iter()
            .find(|keyed| keyed.contains(id))
            .map(KeyedBatchResponseContent::response)
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<HttpResponse>> {
        match self.response_for(id) {
            Some(content) => content.get_by_id(id),
            None => Ok(None),
        }
    }

    pub fn get_by_id_typed<T, F>(&self, id: &str, decoder: F) -> Result<Option<T>>
    where
        F: FnOnce(&Value) -> Result<T>,
    {
        match self.response_for(id) {
            Some(content) => content.get_by_id_typed(id, decoder),
            None => Ok(None),
        }
    }

    pub fn get_by_id_as<T: DeserializeOwned>(&self, id: &str) -> Result<Option<T>> {
        match self.response_for(id) {
            Some(content) => content.get_by_id_as(id),
            None => Ok(None),
        }
    }

    pub fn get_stream_by_id(&self, id: &str) -> Result<Option<Bytes>> {
        match self.response_for(id) {
            Some(content) => content.get_stream_by_id(id),
            None => Ok(None),
        }
    }

    /// Status codes of every physical response, unioned
    ///
    /// An id reported twice keeps the status of the first registered response, matching
    /// [`get_by_id`](Self::get_by_id).
    pub fn get_all_status_codes(&self) -> Result<HashMap<String, u16>> {
        let mut statuses = HashMap::new();
        for keyed in &self.responses {
            for (id, status) in keyed.response.get_all_status_codes()? {
                statuses.entry(id).or_insert(status);
            }
        }
        Ok(statuses)
    }

    pub fn responses(&self) -> &[KeyedBatchResponseContent] {
        &self.responses
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}
