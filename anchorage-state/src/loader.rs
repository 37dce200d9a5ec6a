use std::sync::Arc;

use serde_json::Value;

use crate::backend::StateBackend;
use crate::error::StateError;
use crate::model::{InstanceState, ProviderSchema};
use crate::parser;
use crate::writer::StateWriter;

/// Reads raw persisted records for named instances and hands them to the
/// parser. Performs no validation itself.
pub struct StateLoader {
    backend: Arc<dyn StateBackend>,
}

impl StateLoader {
    pub fn new(backend: Arc<dyn StateBackend>) -> Self {
        Self { backend }
    }

    /// Raw snapshot for `name`; [`StateError::NotFound`] if the backend has
    /// none.
    pub async fn load_raw(&self, name: &str) -> Result<Value, StateError> {
        match self.backend.load_raw_state(name).await? {
            Some(raw) => Ok(raw),
            None => Err(StateError::NotFound(name.to_string())),
        }
    }

    /// Load and parse the state for `name` against the schema `S`.
    pub async fn load<S: ProviderSchema>(&self, name: &str) -> Result<InstanceState<S>, StateError> {
        let raw = self.load_raw(name).await?;
        let state = parser::parse_state::<S>(&raw)?;
        tracing::debug!(instance = name, provider = S::PROVIDER, "loaded instance state");
        Ok(state)
    }

    /// Load `name` and hand the parsed state to a fresh writer on the same
    /// backend.
    pub async fn load_writer<S: ProviderSchema>(
        &self,
        name: &str,
    ) -> Result<StateWriter<S>, StateError> {
        let state = self.load::<S>(name).await?;
        let mut writer = StateWriter::new(self.backend.clone());
        writer.set_state(state);
        Ok(writer)
    }
}
