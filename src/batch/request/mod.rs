//! Outbound side of the batch engine
//!
//! - `content`: one physical batch, bounded by [`MAX_REQUESTS`](crate::batch::MAX_REQUESTS)
//! - `collection`: unbounded steps chunked across pages
//! - `serializer`: the `{"requests":[..]}` wire payload

mod collection;
mod content;
mod serializer;


pub use collection::BatchRequestContentCollection;
pub use content::BatchRequestContent;
pub use serializer::relative_url;
