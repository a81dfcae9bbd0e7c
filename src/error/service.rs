//! Structured service errors and status-keyed error mapping

use super::types::{BatchError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Error decoded from an error-shaped body: `{"error":{"code":..,"message":..,"innerError":{..}}}`
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceError {
    /// HTTP status of the sub-response that carried the error
    pub status: u16,
    /// Service error code, e.g. `Request_ResourceNotFound`
    pub code: Option<String>,
    /// Human readable message
    pub message: Option<String>,
    /// Nested diagnostic object, kept as-is
    pub inner_error: Option<Value>,
    /// Full error body as received
    pub body: Value,
}

impl ServiceError {
    /// Decode `body` when it has the error-envelope shape, `None` otherwise
    pub fn from_envelope(status: u16, body: &Value) -> Option<Self> {
        let error = body.get("error")?.as_object()?;

        let text = |key: &str| error.get(key).and_then(Value::as_str).map(str::to_string);

        Some(Self {
            status,
            code: text("code"),
            message: text("message"),
            inner_error: error
                .get("innerError")
                .or_else(|| error.get("innererror"))
                .cloned(),
            body: body.clone(),
        })
    }

    /// Throttling and server-side failures can be retried
    pub fn is_retryable(&self) -> bool {
        self.status == 429 || self.status >= 500
    }

    /// `request-id` reported by the service inside `innerError`
    pub fn request_id(&self) -> Option<&str> {
        self.inner_error
            .as_ref()
            .and_then(|inner| inner.get("request-id"))
            .and_then(Value::as_str)
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Service error (HTTP {})", self.status)?;
        if let Some(code) = &self.code {
            write!(f, " {}", code)?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ServiceError {}

/// Factory turning a decoded service error into the caller's error
pub type ErrorFactory = Arc<dyn Fn(ServiceError) -> BatchError + Send + Sync>;

/// Status-keyed error factories
///
/// Keys are an exact status (`"404"`) or a status class wildcard (`"4XX"`, `"5XX"`).
/// An exact match wins over a class match; errors with no matching key stay
/// [`BatchError::Service`].
#[derive(Clone, Default)]
pub struct ErrorMapping {
    factories: HashMap<String, ErrorFactory>,
}

impl ErrorMapping {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `key`, builder style
    pub fn with<F>(mut self, key: &str, factory: F) -> Result<Self>
    where
        F: Fn(ServiceError) -> BatchError + Send + Sync + 'static,
    {
        self.insert(key, factory)?;
        Ok(self)
    }

    /// Register a factory under `key`
    pub fn insert<F>(&mut self, key: &str, factory: F) -> Result<()>
    where
        F: Fn(ServiceError) -> BatchError + Send + Sync + 'static,
    {
        let key = normalize_key(key)?;
        self.factories.insert(key, Arc::new(factory));
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Factory registered for `status`, exact code first
    pub fn factory_for(&self, status: u16) -> Option<&ErrorFactory> {
        self.factories
            .get(&status.to_string())
            .or_else(|| self.factories.get(&format!("{}XX", status / 100)))
    }

    /// Convert a service error through the matching factory
    pub fn map(&self, error: ServiceError) -> BatchError {
        match self.factory_for(error.status) {
            Some(factory) => factory(error),
            None => BatchError::Service(error),
        }
    }
}

impl fmt::Debug for ErrorMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.factories.keys().collect();
        keys.sort();
        f.debug_struct("ErrorMapping").field("keys", &keys).finish()
    }
}

fn normalize_key(key: &str) -> Result<String> {
    let key = key.trim().to_ascii_uppercase();
    let bytes = key.as_bytes();

    let valid = match bytes {
        [b'4' | b'5', b'X', b'X'] => true,
        [_, _, _] => key
            .parse::<u16>()
            .map(|code| (400..600).contains(&code))
            .unwrap_or(false),
        _ => false,
    };

    if valid {
        Ok(key)
    } else {
        Err(BatchError::invalid_argument(format!(
            "error mapping key '{}' must be a 4xx/5xx status code or a 4XX/5XX class",
            key
        )))
    }
}
