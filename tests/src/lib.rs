//! # Streamgate Test Suite
//!
//! Cross-crate tests that drive the gateway with real credential material:
//! RSA identity tokens fetched over a live local key endpoint, secp256k1
//! wallet signatures, and BLS capability tokens minted against a throwaway
//! network key.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Credential mints and canned HTTP servers
//! │
//! └── integration/      # End-to-end flows
//!     ├── auth_flows.rs    # Dispatcher + key source over real HTTP
//!     └── gateway_flows.rs # Full router: publish, playback, upload, CORS
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p streamgate-tests
//!
//! # By category
//! cargo test -p streamgate-tests integration::auth_flows::
//! cargo test -p streamgate-tests integration::gateway_flows::
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod support;
