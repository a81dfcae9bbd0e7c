//! Error handling for the batch engine
//!
//! This module defines the crate error type, the structured service error decoded from
//! error-shaped sub-responses, and the status-keyed mapping used to turn those into
//! caller-specific errors.

mod helpers;
mod service;
mod types;

pub use service::{ErrorFactory, ErrorMapping, ServiceError};
pub use types::{BatchError, Result};
