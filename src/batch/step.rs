//! Batch steps shared by the request and response sides

use crate::error::{BatchError, Result};
use crate::http::{CONTENT_TYPE, Headers, HttpRequest, HttpResponse, StepBody, find_header};
use bytes::Bytes;

/// Common shape of a step: id, headers and an optional body
pub trait BatchStep {
    fn id(&self) -> &str;
    fn headers(&self) -> &Headers;
    fn body(&self) -> Option<&StepBody>;
}

/// One outbound call plus the ids it must wait for
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequestStep {
    id: String,
    request: HttpRequest,
    depends_on: Vec<String>,
}

impl BatchRequestStep {
    pub fn new<S: Into<String>>(id: S, request: HttpRequest) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(BatchError::invalid_argument("step id must not be empty"));
        }
        Ok(Self {
            id,
            request,
            depends_on: Vec::new(),
        })
    }

    /// Declare the steps this one must run after
    pub fn with_depends_on<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn add_depends_on<S: Into<String>>(&mut self, id: S) {
        self.depends_on.push(id.into());
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    pub fn into_request(self) -> HttpRequest {
        self.request
    }

    /// Strip every occurrence of `id`, returning how many were removed
    pub(crate) fn remove_dependency(&mut self, id: &str) -> usize {
        let before = self.depends_on.len();
        self.depends_on.retain(|dep| dep != id);
        before - self.depends_on.len()
    }
}

impl BatchStep for BatchRequestStep {
    fn id(&self) -> &str {
        &self.id
    }

    fn headers(&self) -> &Headers {
        &self.request.headers
    }

    fn body(&self) -> Option<&StepBody> {
        self.request.body.as_ref()
    }
}

/// One demultiplexed sub-response
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResponseStep {
    /// Step id echoed by the service
    pub id: String,
    /// HTTP status of this step
    pub status: u16,
    /// Headers, names as received
    pub headers: Headers,
    /// Body tagged by the step's content type
    pub body: Option<StepBody>,
}

impl BatchResponseStep {
    pub fn is_success(&self) -> bool {
        super::is_success_status_code(self.status)
    }

    pub fn content_type(&self) -> Option<&str> {
        find_header(&self.headers, CONTENT_TYPE).map(|(_, value)| value)
    }

    /// Body bytes as a standalone response would carry them
    pub fn body_bytes(&self) -> Option<Bytes> {
        self.body.as_ref().map(StepBody::to_bytes)
    }

    /// Standalone raw response for this step
    pub fn to_http_response(&self) -> HttpResponse {
        let mut headers = self.headers.clone();
        if let Some(body) = &self.body {
            if find_header(&headers, CONTENT_TYPE).is_none() {
                headers.insert(CONTENT_TYPE.to_string(), body.content_type().to_string());
            }
        }
        HttpResponse::new(
            self.status,
            headers,
            self.body_bytes().unwrap_or_default(),
        )
    }
}

impl BatchStep for BatchResponseStep {
    fn id(&self) -> &str {
        &self.id
    }

    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn body(&self) -> Option<&StepBody> {
        self.body.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn get(url: &str) -> HttpRequest {
        HttpRequest::get(url).unwrap()
    }

    #[test]
    fn test_request_step_rejects_blank_id() {
        let result = BatchRequestStep::new("  ", get("https://graph.microsoft.com/v1.0/me"));
        assert!(matches!(result, Err(BatchError::InvalidArgument(_))));
    }

    #[test]
    fn test_remove_dependency_strips_duplicates() {
        let mut step = BatchRequestStep::new("3", get("https://graph.microsoft.com/v1.0/me"))
            .unwrap()
            .with_depends_on(["1", "2", "1"]);

        assert_eq!(step.remove_dependency("1"), 2);
        assert_eq!(step.depends_on(), ["2".to_string()]);
        assert_eq!(step.remove_dependency("9"), 0);
    }

    #[test]
    fn test_request_step_exposes_common_shape() {
        let request = HttpRequest::post(
            "https://graph.microsoft.com/v1.0/me/events",
            StepBody::json(json!({"subject": "sync"})),
        )
        .unwrap()
        .with_header("Prefer", "outlook.timezone=\"UTC\"");
        let step = BatchRequestStep::new("a", request).unwrap();

        let shape: &dyn BatchStep = &step;
        assert_eq!(shape.id(), "a");
        assert_eq!(shape.headers().len(), 1);
        assert_eq!(shape.body(), Some(&StepBody::json(json!({"subject": "sync"}))));
    }

    #[test]
    fn test_response_step_to_http_response_adds_content_type() {
        let step = BatchResponseStep {
            id: "1".to_string(),
            status: 200,
            headers: Headers::new(),
            body: Some(StepBody::json(json!({"id": "u1"}))),
        };

        let response = step.to_http_response();
        assert_eq!(response.status, 200);
        assert_eq!(response.content_type(), Some("application/json"));
        assert_eq!(&response.body[..], br#"{"id":"u1"}"#);
    }

    #[test]
    fn test_response_step_without_body() {
        let step = BatchResponseStep {
            id: "1".to_string(),
            status: 204,
            headers: Headers::new(),
            body: None,
        };

        assert!(step.is_success());
        assert!(step.body_bytes().is_none());
        assert!(step.to_http_response().body.is_empty());
    }
}
