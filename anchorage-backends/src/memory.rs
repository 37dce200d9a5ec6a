use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use anchorage_state::StateBackend;

/// Keeps snapshots in process memory. Stands in for a real durability
/// boundary during tests and provisioning dry-runs; nothing survives a
/// restart.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    states: Mutex<HashMap<String, Value>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.states.lock().expect("state map lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StateBackend for MemoryBackend {
    async fn persist_state(&self, name: &str, state: &Value) -> Result<()> {
        self.states
            .lock()
            .expect("state map lock poisoned")
            .insert(name.to_string(), state.clone());
        Ok(())
    }

    async fn load_raw_state(&self, name: &str) -> Result<Option<Value>> {
        Ok(self
            .states
            .lock()
            .expect("state map lock poisoned")
            .get(name)
            .cloned())
    }

    async fn destroy_state(&self, name: &str) -> Result<()> {
        self.states
            .lock()
            .expect("state map lock poisoned")
            .remove(name);
        Ok(())
    }
}
