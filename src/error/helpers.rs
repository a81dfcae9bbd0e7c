//! Helper functions for creating specific error types

use super::types::BatchError;

impl BatchError {
    pub fn capacity_exceeded(limit: usize, attempted: usize) -> Self {
        Self::CapacityExceeded { limit, attempted }
    }

    pub fn invalid_dependency<S: Into<String>, M: Into<String>>(step_id: S, missing: M) -> Self {
        Self::InvalidDependency {
            step_id: step_id.into(),
            missing: missing.into(),
        }
    }

    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn read_only<S: Into<String>>(operation: S) -> Self {
        Self::ReadOnly(operation.into())
    }

    pub fn malformed_element<S: Into<String>, R: Into<String>>(id: S, reason: R) -> Self {
        Self::MalformedElement {
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed_response<S: Into<String>>(message: S) -> Self {
        Self::MalformedResponse(message.into())
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport(message.into())
    }
}
