//! Inbound side of the batch engine
//!
//! - `content`: one physical response, parsed once and read per step id
//! - `collection`: several physical responses keyed by the ids they answer
//! - `parser`: the `{"responses":[..]}` wire payload

mod collection;
mod content;
mod parser;


pub use collection::{BatchResponseContentCollection, KeyedBatchResponseContent};
pub use content::BatchResponseContent;
