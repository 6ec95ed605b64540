//! # Adapters Module
//!
//! Infrastructure adapters implementing the outbound ports.

pub mod memory_store;
pub mod stream_http;

pub use memory_store::MemoryStore;
pub use stream_http::StreamHostClient;
