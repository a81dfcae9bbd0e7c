//! Request descriptions and their conversion into wire-ready requests

use super::body::StepBody;
use super::traits::RequestConverter;
use super::types::{Headers, HttpRequest};
use crate::error::{BatchError, Result};
use async_trait::async_trait;
use reqwest::Method;
use url::Url;

/// Higher-level description of one API call
#[derive(Debug, Clone, PartialEq)]
pub struct RequestInformation {
    /// HTTP method
    pub method: Method,
    /// Resource path relative to the service root (`/me/messages`), or an absolute URL
    pub path: String,
    /// Query options in order, values used verbatim (`$filter` expressions and the like)
    pub query: Vec<(String, String)>,
    /// Request headers
    pub headers: Headers,
    /// Optional content
    pub content: Option<StepBody>,
}

impl RequestInformation {
    pub fn new<S: Into<String>>(method: Method, path: S) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Headers::new(),
            content: None,
        }
    }

    pub fn with_query<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_content(mut self, content: StepBody) -> Self {
        self.content = Some(content);
        self
    }
}

/// Resolves request paths against a versioned service root such as
/// `https://graph.microsoft.com/v1.0`
#[derive(Debug, Clone)]
pub struct BaseUrlConverter {
    base_url: Url,
}

impl BaseUrlConverter {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(BatchError::invalid_argument(format!(
                "base URL '{}' cannot be used as a base",
                base_url
            )));
        }
        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn resolve(&self, info: &RequestInformation) -> Result<Url> {
        let mut url = if info.path.starts_with("http://") || info.path.starts_with("https://") {
            Url::parse(&info.path)?
        } else {
            let root = self.base_url.as_str().trim_end_matches('/');
            Url::parse(&format!("{}/{}", root, info.path.trim_start_matches('/')))?
        };

        if !info.query.is_empty() {
            let extra = info
                .query
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect::<Vec<_>>()
                .join("&");
            let query = match url.query() {
                Some(existing) if !existing.is_empty() => format!("{}&{}", existing, extra),
                _ => extra,
            };
            url.set_query(Some(&query));
        }

        Ok(url)
    }
}

#[async_trait]
impl RequestConverter for BaseUrlConverter {
    async fn convert(&self, info: RequestInformation) -> Result<HttpRequest> {
        let url = self.resolve(&info)?;
        Ok(HttpRequest {
            method: info.method,
            url,
            headers: info.headers,
            body: info.content,
        })
    }
}
