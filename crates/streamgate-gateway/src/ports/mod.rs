//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture. The gateway's inbound
//! surface is HTTP itself; what lives here are the driven dependencies:
//! the catalog store and the video hosting provider.

pub mod outbound;

pub use outbound::{
    DirectUploadRequest, HostError, StoreError, UpstreamResponse, VideoHost, VideoStore,
};
