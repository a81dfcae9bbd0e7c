//! Wire-ready request and raw response types

use super::body::StepBody;
use crate::error::{BatchError, Result};
use bytes::Bytes;
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use url::Url;

/// Header map that keeps names exactly as received
pub type Headers = HashMap<String, String>;

/// Name of the content type header
pub const CONTENT_TYPE: &str = "Content-Type";

/// Case-insensitive header lookup
pub fn find_header<'a>(headers: &'a Headers, name: &str) -> Option<(&'a str, &'a str)> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(key, value)| (key.as_str(), value.as_str()))
}

/// Request ready to be placed on the wire, either standalone or as a batch step
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL including the API version segment
    pub url: Url,
    /// Request headers
    pub headers: Headers,
    /// Optional body
    pub body: Option<StepBody>,
}

impl HttpRequest {
    pub fn new(method: Method, url: &str) -> Result<Self> {
        Ok(Self {
            method,
            url: Url::parse(url)?,
            headers: Headers::new(),
            body: None,
        })
    }

    pub fn get(url: &str) -> Result<Self> {
        Self::new(Method::GET, url)
    }

    pub fn delete(url: &str) -> Result<Self> {
        Self::new(Method::DELETE, url)
    }

    pub fn post(url: &str, body: StepBody) -> Result<Self> {
        Ok(Self::new(Method::POST, url)?.with_body(body))
    }

    pub fn patch(url: &str, body: StepBody) -> Result<Self> {
        Ok(Self::new(Method::PATCH, url)?.with_body(body))
    }

    pub fn put(url: &str, body: StepBody) -> Result<Self> {
        Ok(Self::new(Method::PUT, url)?.with_body(body))
    }

    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: StepBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name).map(|(_, value)| value)
    }

    /// Explicit content type header, falling back to the one implied by the body
    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE)
            .or_else(|| self.body.as_ref().map(StepBody::content_type))
    }
}

/// Raw response as returned by the transport, or reconstructed for one batch step
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers, names as received
    pub headers: Headers,
    /// Response body
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, headers: Headers, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// JSON response with the matching content type
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        let mut headers = Headers::new();
        headers.insert(CONTENT_TYPE.to_string(), super::body::APPLICATION_JSON.to_string());
        Self::new(status, headers, Bytes::from(value.to_string()))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name).map(|(_, value)| value)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE)
    }

    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| BatchError::malformed_response(format!("body is not UTF-8: {}", e)))
    }

    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}
