//! HTTP-facing types and the collaborator seams of the batch engine
//!
//! - `body`: polymorphic step bodies and content-type helpers
//! - `types`: wire-ready requests and raw responses
//! - `traits`: transport, request conversion and id generation interfaces
//! - `converter`: request descriptions resolved against a service root
//! - `transport`: reqwest-backed executor

mod body;
mod converter;
mod traits;
pub mod transport;
mod types;

pub use body::{
    APPLICATION_JSON, OCTET_STREAM, StepBody, TEXT_PLAIN, is_json_content_type,
    is_text_content_type,
};
pub use converter::{BaseUrlConverter, RequestInformation};
pub use reqwest::Method;
pub use traits::{IdGenerator, RequestConverter, RequestExecutor, SequentialIdGenerator, UuidIdGenerator};
#[cfg(test)]
pub use traits::{MockRequestConverter, MockRequestExecutor};
pub use transport::ReqwestExecutor;
pub use types::{CONTENT_TYPE, Headers, HttpRequest, HttpResponse, find_header};
