//! Relay client and response streaming for Palaver
//!
//! This crate implements the submit-then-poll exchange with the remote
//! task relay: task insertion, output polling, and the chunked response
//! stream the front-ends consume.

pub mod relay;
pub mod session;
pub mod snapshot;
pub mod streaming;

// Re-export key types for convenience
pub use relay::RelayClient;
pub use session::ChatSession;
pub use snapshot::{PollRecord, PollSnapshot, suffix_delta};
pub use streaming::{ChunkKind, ResponseChunk, ResponseStream};
