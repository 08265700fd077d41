pub mod client;
pub mod sse;
pub mod types;

pub use client::{EventStreamClient, StreamHandle, StreamUpdate};
pub use sse::SseDecoder;
pub use types::{EnvelopeKind, StreamEnvelope};
