//! # In-Memory Store Adapter
//!
//! `VideoStore` backed by a process-local map. This is the store the binary
//! runs with; a durable backend slots in behind the same port without the
//! service noticing. Contents vanish on restart.

use crate::ports::outbound::{StoreError, VideoStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// `VideoStore` implementation on a process-local map.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VideoStore for MemoryStore {
    // The map cannot fail; the error path exists for durable backends.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }
}
