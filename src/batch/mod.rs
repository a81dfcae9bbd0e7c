//! JSON batching engine
//!
//! Packs independent API calls into `$batch` payloads, tracks `dependsOn` ordering between
//! them, chunks oversized batches across several physical exchanges, and demultiplexes the
//! physical responses back into per-step results.
//!
//! - `step`: request and response steps
//! - `request`: [`BatchRequestContent`] and the auto-chunking [`BatchRequestContentCollection`]
//! - `response`: [`BatchResponseContent`] and the id-keyed [`BatchResponseContentCollection`]

pub mod request;
pub mod response;
mod step;


pub use request::{BatchRequestContent, BatchRequestContentCollection};
pub use response::{
    BatchResponseContent, BatchResponseContentCollection, KeyedBatchResponseContent,
};
pub use step::{BatchRequestStep, BatchResponseStep, BatchStep};

/// Most steps the service accepts in one physical exchange
pub const MAX_REQUESTS: usize = 20;

/// True for 2xx status codes
pub fn is_success_status_code(code: u16) -> bool {
    (200..300).contains(&code)
}
