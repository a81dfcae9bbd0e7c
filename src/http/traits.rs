//! Collaborator interfaces consumed by the batch engine
//!
//! The engine never performs I/O itself. It converts request descriptions, executes
//! wire-ready requests and mints step ids only through these seams.

use super::converter::RequestInformation;
use super::types::{HttpRequest, HttpResponse};
use crate::error::Result;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Executes one wire-ready request and returns the raw response
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Turns a higher-level request description into a wire-ready request
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestConverter: Send + Sync {
    async fn convert(&self, info: RequestInformation) -> Result<HttpRequest>;
}

/// Source of fresh step ids
pub trait IdGenerator: Send + Sync + Debug {
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Monotonic numeric ids starting at 1, handy for readable payloads
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> String {
        (self.next.fetch_add(1, Ordering::Relaxed) + 1).to_string()
    }
}
