//! # Domain Layer
//!
//! Pure verification logic with no I/O dependencies.
//! This is the inner layer of the hexagonal architecture.

pub mod capability;
pub mod entities;
pub mod errors;
pub mod identity;
pub mod wallet;
