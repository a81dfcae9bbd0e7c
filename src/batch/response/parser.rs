//! Wire payload for inbound batches
//!
//! `{"responses":[{"id":..,"status":..,"headers":{..}?,"body":..?}],"@odata.nextLink":..?}`

use crate::batch::BatchResponseStep;
use crate::error::{BatchError, Result};
use crate::http::{CONTENT_TYPE, Headers, StepBody};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct WirePayload {
    responses: Option<Vec<Value>>,
    #[serde(rename = "@odata.nextLink")]
    next_link: Option<String>,
}

/// One sub-response, or the reason it could not be rebuilt
#[derive(Debug, Clone)]
pub(crate) struct ParsedEntry {
    pub id: String,
    pub step: std::result::Result<BatchResponseStep, String>,
}

/// Every sub-response of one physical response, in wire order
#[derive(Debug, Clone, Default)]
pub(crate) struct ParsedBatch {
    pub entries: Vec<ParsedEntry>,
    pub next_link: Option<String>,
}

impl ParsedBatch {
    pub fn entry(&self, id: &str) -> Option<&ParsedEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }
}

/// Parse a physical response body
///
/// Only a body that is not a JSON object with a `responses` array fails as a whole. Problems
/// inside one element stay attached to that element's id.
pub(crate) fn parse(body: &[u8]) -> Result<ParsedBatch> {
    let payload: WirePayload = serde_json::from_slice(body)
        .map_err(|e| BatchError::malformed_response(format!("invalid batch payload: {}", e)))?;

    let Some(responses) = payload.responses else {
        return Err(BatchError::malformed_response("missing 'responses' array"));
    };

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(responses.len());

    for (index, element) in responses.into_iter().enumerate() {
        let Some(id) = element_id(&element) else {
            warn!(index, "Skipping batch response element without an id");
            continue;
        };
        if !seen.insert(id.clone()) {
            warn!(step_id = %id, "Ignoring repeated batch response element");
            continue;
        }

        let step = build_step(id.clone(), element);
        if let Err(reason) = &step {
            warn!(step_id = %id, reason = %reason, "Malformed batch response element");
        }
        entries.push(ParsedEntry { id, step });
    }

    debug!(
        elements = entries.len(),
        next_link = payload.next_link.is_some(),
        "Parsed batch response"
    );

    Ok(ParsedBatch {
        entries,
        next_link: payload.next_link,
    })
}

fn element_id(element: &Value) -> Option<String> {
    match element.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn build_step(id: String, element: Value) -> std::result::Result<BatchResponseStep, String> {
    let Value::Object(mut fields) = element else {
        return Err("element is not an object".to_string());
    };

    let status = match fields.get("status") {
        None | Some(Value::Null) => return Err("missing status".to_string()),
        Some(value) => parse_status(value)?,
    };

    let headers = match fields.remove("headers") {
        None | Some(Value::Null) => Headers::new(),
        Some(Value::Object(map)) => collect_headers(map),
        Some(_) => return Err("headers is not an object".to_string()),
    };

    let content_type = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(CONTENT_TYPE))
        .map(|(_, value)| value.as_str());

    let body = match fields.remove("body") {
        None | Some(Value::Null) => None,
        Some(value) => Some(StepBody::from_wire_value(value, content_type)),
    };

    Ok(BatchResponseStep {
        id,
        status,
        headers,
        body,
    })
}

fn parse_status(value: &Value) -> std::result::Result<u16, String> {
    let status = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    status
        .and_then(|s| u16::try_from(s).ok())
        .filter(|s| (100..600).contains(s))
        .ok_or_else(|| format!("invalid status {}", value))
}

fn collect_headers(map: Map<String, Value>) -> Headers {
    map.into_iter()
        .map(|(name, value)| {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (name, value)
        })
        .collect()
}
