//! Error types for the batch engine

use super::service::ServiceError;
use thiserror::Error;

/// Result type alias for the batch engine
pub type Result<T> = std::result::Result<T, BatchError>;

/// Main error type for the batch engine
#[derive(Error, Debug)]
pub enum BatchError {
    /// Adding a step would push a content past its capacity
    #[error("Batch capacity exceeded: limit is {limit} requests, attempted to hold {attempted}")]
    CapacityExceeded { limit: usize, attempted: usize },

    /// A step with the same id is already present
    #[error("Duplicate step id: {0}")]
    DuplicateStepId(String),

    /// A step depends on an id that is not known at insertion time
    #[error("Invalid dependency: step '{step_id}' depends on unknown step '{missing}'")]
    InvalidDependency { step_id: String, missing: String },

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Mutation of a collection that has been handed off for execution
    #[error("Operation not allowed on a read-only batch collection: {0}")]
    ReadOnly(String),

    /// One sub-response could not be reconstructed
    #[error("Malformed batch response element '{id}': {reason}")]
    MalformedElement { id: String, reason: String },

    /// The physical response is not a batch payload
    #[error("Malformed batch response: {0}")]
    MalformedResponse(String),

    /// Error-shaped sub-response
    #[error("{0}")]
    Service(ServiceError),

    /// Error-shaped sub-response converted by a caller-supplied factory
    #[error("Service error (HTTP {status}): {source}")]
    Mapped {
        status: u16,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A success-shaped body did not decode into the requested type
    #[error("Failed to decode response '{id}': {source}")]
    Decode {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport collaborator failures
    #[error("Transport error: {0}")]
    Transport(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// URL errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BatchError {
    /// Whether resending the same batch could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            BatchError::Transport(_) | BatchError::HttpClient(_) => true,
            BatchError::Service(err) => err.is_retryable(),
            BatchError::Mapped { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Error decoded from an error-shaped sub-response
    pub fn is_service_error(&self) -> bool {
        matches!(self, BatchError::Service(_) | BatchError::Mapped { .. })
    }

    /// Error raised synchronously by a rejected add, remove or construction
    pub fn is_rejected_operation(&self) -> bool {
        matches!(
            self,
            BatchError::CapacityExceeded { .. }
                | BatchError::DuplicateStepId(_)
                | BatchError::InvalidDependency { .. }
                | BatchError::ReadOnly(_)
        )
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            BatchError::Service(err) => Some(err.status),
            BatchError::Mapped { status, .. } => Some(*status),
            BatchError::HttpClient(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
