//! Wire payload for outbound batches
//!
//! `{"requests":[{"id":..,"url":..,"method":..,"dependsOn":[..]?,"headers":{..}?,"body":..?}]}`

use crate::batch::BatchRequestStep;
use crate::error::{BatchError, Result};
use crate::http::{CONTENT_TYPE, find_header};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

#[derive(Debug, Serialize)]
pub(crate) struct WirePayload<'a> {
    pub requests: Vec<WireRequest<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireRequest<'a> {
    pub id: &'a str,
    pub url: String,
    pub method: &'a str,
    #[serde(rename = "dependsOn", skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<&'a str, &'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl<'a> WireRequest<'a> {
    pub(crate) fn from_step(step: &'a BatchRequestStep) -> Result<Self> {
        let request = step.request();

        let mut headers: BTreeMap<&str, &str> = request
            .headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();

        // Content type travels with the body, inferred when the caller set none.
        if let Some(body) = &request.body {
            if find_header(&request.headers, CONTENT_TYPE).is_none() {
                headers.insert(CONTENT_TYPE, body.content_type());
            }
        }

        let body = match &request.body {
            Some(body) => Some(body.to_wire_value()?),
            None => None,
        };

        Ok(Self {
            id: step.id(),
            url: relative_url(&request.url)?,
            method: request.method.as_str(),
            depends_on: step.depends_on().iter().map(String::as_str).collect(),
            headers: (!headers.is_empty()).then_some(headers),
            body,
        })
    }
}

/// Path and query with the leading API-version segment removed
///
/// `https://host/v1.0/me` becomes `/me` and `https://host/beta/users?$filter=x` becomes
/// `/users?$filter=x`. The query keeps its percent-encoding. A URL whose first segment is
/// not `beta` or `v<major>[.<minor>]` is rejected.
pub fn relative_url(url: &Url) -> Result<String> {
    let path = url.path().trim_start_matches('/');
    let (version, rest) = path.split_once('/').unwrap_or((path, ""));
    if !is_version_segment(version) {
        return Err(BatchError::invalid_argument(format!(
            "URL '{}' has no API version segment",
            url
        )));
    }

    let mut relative = format!("/{}", rest);
    if let Some(query) = url.query() {
        relative.push('?');
        relative.push_str(query);
    }
    Ok(relative)
}

fn is_version_segment(segment: &str) -> bool {
    if segment == "beta" {
        return true;
    }
    let Some(number) = segment.strip_prefix('v') else {
        return false;
    };
    let (major, minor) = match number.split_once('.') {
        Some((major, minor)) => (major, Some(minor)),
        None => (number, None),
    };
    let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    digits(major) && minor.is_none_or(digits)
}
