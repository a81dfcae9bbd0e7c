//! # graph-batch
//!
//! JSON batching for Graph-style REST APIs: pack up to twenty calls into one `$batch`
//! exchange, order them with `dependsOn`, split larger sets across several exchanges, and
//! read every call's result back by id.
//!
//! ## Features
//!
//! - **Validated batches**: unique ids, a hard step ceiling and dependency checks on every add
//! - **Auto-chunking**: collections seal full pages and open new ones transparently
//! - **Faithful payloads**: relative URLs, nested JSON bodies, inferred content types
//! - **Per-step responses**: raw, streamed or typed retrieval from one parse-once view
//! - **Typed service errors**: error envelopes mapped by status code or `4XX`/`5XX` class
//! - **Retry batches**: rebuild only the steps that did not succeed
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use graph_batch::{BatchClient, BatchConfig, HttpRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     graph_batch::logging::init();
//!
//!     let client = BatchClient::from_config(BatchConfig::from_env()?)?;
//!     let mut collection = client.new_collection()?;
//!
//!     let me = collection.add_request(HttpRequest::get("https://graph.microsoft.com/v1.0/me")?)?;
//!     collection.add_request(HttpRequest::get("https://graph.microsoft.com/v1.0/me/drive")?)?;
//!
//!     let responses = client.post_collection(&mut collection).await?;
//!     let profile: serde_json::Value = responses.get_by_id_as(&me)?.unwrap_or_default();
//!     println!("Signed in as {}", profile["displayName"]);
//!
//!     let statuses = responses.get_all_status_codes()?;
//!     let retry = collection.build_failed_requests_collection(&statuses)?;
//!     println!("{} steps to retry", retry.len());
//!
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;

// Re-export main types
pub use batch::{
    BatchRequestContent, BatchRequestContentCollection, BatchRequestStep,
    BatchResponseContent, BatchResponseContentCollection, BatchResponseStep, BatchStep,
    KeyedBatchResponseContent, MAX_REQUESTS, is_success_status_code,
};
pub use client::BatchClient;
pub use config::{BatchConfig, ConfigBuilder};
pub use error::{BatchError, ErrorMapping, Result, ServiceError};
pub use http::{
    BaseUrlConverter, HttpRequest, HttpResponse, IdGenerator, Method, RequestConverter,
    RequestExecutor, RequestInformation, ReqwestExecutor, StepBody,
};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
