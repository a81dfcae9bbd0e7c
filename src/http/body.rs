//! Polymorphic step bodies
//!
//! A body travels as structured JSON, plain text, or opaque bytes. Keeping the three apart
//! lets the batch payload embed JSON as a nested value instead of an escaped string.

use crate::error::{BatchError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

/// Content type used for JSON bodies and batch payloads
pub const APPLICATION_JSON: &str = "application/json";
/// Content type inferred for text bodies
pub const TEXT_PLAIN: &str = "text/plain";
/// Content type inferred for binary bodies without one
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Body of a request or response step
#[derive(Debug, Clone, PartialEq)]
pub enum StepBody {
    /// Structured JSON value
    Json(Value),
    /// UTF-8 text
    Text(String),
    /// Opaque bytes tagged with their media type
    Bytes { data: Bytes, content_type: String },
}

impl StepBody {
    pub fn json(value: Value) -> Self {
        StepBody::Json(value)
    }

    pub fn text<S: Into<String>>(text: S) -> Self {
        StepBody::Text(text.into())
    }

    pub fn bytes<B: Into<Bytes>, S: Into<String>>(data: B, content_type: S) -> Self {
        StepBody::Bytes {
            data: data.into(),
            content_type: content_type.into(),
        }
    }

    /// Serialize a typed model into a JSON body
    pub fn from_serializable<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(StepBody::Json(serde_json::to_value(value)?))
    }

    /// Media type implied by the variant
    pub fn content_type(&self) -> &str {
        match self {
            StepBody::Json(_) => APPLICATION_JSON,
            StepBody::Text(_) => TEXT_PLAIN,
            StepBody::Bytes { content_type, .. } if content_type.is_empty() => OCTET_STREAM,
            StepBody::Bytes { content_type, .. } => content_type,
        }
    }

    /// Bytes as they would travel in a standalone HTTP exchange
    pub fn to_bytes(&self) -> Bytes {
        match self {
            StepBody::Json(value) => Bytes::from(value.to_string()),
            StepBody::Text(text) => Bytes::from(text.clone()),
            StepBody::Bytes { data, .. } => data.clone(),
        }
    }

    /// Value embedded in a batch payload
    ///
    /// JSON is nested as-is, text becomes a JSON string, bytes with a JSON media type are
    /// re-parsed and nested, bytes with a text media type become a string, and any other
    /// bytes are base64 encoded. Bytes that do not match their JSON or text media type fail
    /// rather than travel under a misleading content type.
    pub fn to_wire_value(&self) -> Result<Value> {
        match self {
            StepBody::Json(value) => Ok(value.clone()),
            StepBody::Text(text) => Ok(Value::String(text.clone())),
            StepBody::Bytes { data, content_type } if is_json_content_type(content_type) => {
                Ok(serde_json::from_slice::<Value>(data)?)
            }
            StepBody::Bytes { data, content_type } if is_text_content_type(content_type) => {
                match std::str::from_utf8(data) {
                    Ok(text) => Ok(Value::String(text.to_string())),
                    Err(e) => Err(BatchError::invalid_argument(format!(
                        "body tagged '{}' is not UTF-8: {}",
                        content_type, e
                    ))),
                }
            }
            StepBody::Bytes { data, .. } => Ok(Value::String(STANDARD.encode(data))),
        }
    }

    /// Rebuild a body from a batch payload value, tagged by the step's content type
    ///
    /// A missing content type is treated as JSON, the service default.
    pub fn from_wire_value(value: Value, content_type: Option<&str>) -> Self {
        match content_type {
            None => StepBody::Json(value),
            Some(ct) if is_json_content_type(ct) => StepBody::Json(value),
            Some(ct) => match value {
                Value::String(text) if is_text_content_type(ct) => StepBody::Text(text),
                Value::String(text) => match STANDARD.decode(text.as_bytes()) {
                    Ok(data) => StepBody::bytes(data, ct),
                    Err(_) => StepBody::bytes(text.into_bytes(), ct),
                },
                other => StepBody::bytes(other.to_string().into_bytes(), ct),
            },
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            StepBody::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// `application/json` and `+json` structured syntax suffixes, parameters ignored
pub fn is_json_content_type(content_type: &str) -> bool {
    let mime = essence(content_type);
    mime == APPLICATION_JSON || mime.ends_with("+json")
}

/// Media types carried as strings: `text/*`, XML in all its forms, form data and scripts
pub fn is_text_content_type(content_type: &str) -> bool {
    let mime = essence(content_type);
    mime.starts_with("text/")
        || mime.ends_with("/xml")
        || mime.ends_with("+xml")
        || matches!(
            mime.as_str(),
            "application/x-www-form-urlencoded"
                | "application/javascript"
                | "application/ecmascript"
        )
}

fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
