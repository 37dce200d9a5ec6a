use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::backend::StateBackend;
use crate::error::StateError;
use crate::merge::deep_merge;
use crate::model::{
    EventType, InstanceEvent, InstanceState, Payload, ProviderSchema, STATE_MAX_EVENTS,
};

/// Exclusive owner of one instance's in-memory state.
///
/// Every mutation follows persist-then-commit: the current state is cloned,
/// the mutation is applied to the clone, the clone is submitted to the
/// backend, and only a successful persist replaces the in-memory state. A
/// failed persist leaves the writer exactly as it was before the call, so
/// the in-memory copy never outruns durable storage.
///
/// Mutations take `&mut self`, so overlapping in-flight mutations on one
/// writer cannot be expressed. The backend does no cross-process locking;
/// a given instance name must have a single owner at a time.
pub struct StateWriter<S: ProviderSchema> {
    backend: Arc<dyn StateBackend>,
    state: Option<InstanceState<S>>,
}

impl<S: ProviderSchema> StateWriter<S> {
    pub fn new(backend: Arc<dyn StateBackend>) -> Self {
        Self {
            backend,
            state: None,
        }
    }

    /// Hand the writer its state. Until this is called, every other method
    /// fails with [`StateError::Uninitialized`].
    pub fn set_state(&mut self, state: InstanceState<S>) {
        self.state = Some(state);
    }

    /// Live in-memory state.
    pub fn state(&self) -> Result<&InstanceState<S>, StateError> {
        self.state.as_ref().ok_or(StateError::Uninitialized)
    }

    /// Deep, independent copy of the current state; safe for the caller to
    /// inspect or mutate freely.
    pub fn clone_state(&self) -> Result<InstanceState<S>, StateError> {
        self.state().map(|state| state.clone())
    }

    pub fn instance_name(&self) -> Result<&str, StateError> {
        Ok(self.state()?.name.as_str())
    }

    /// Replace the provision input wholesale, then persist.
    pub async fn set_provision_input(&mut self, input: S::ProvisionInput) -> Result<(), StateError> {
        self.commit(|state| {
            state.provision.input = input;
            Ok(())
        })
        .await
    }

    /// Replace the provision output, then persist. `None` clears it.
    pub async fn set_provision_output(
        &mut self,
        output: Option<S::ProvisionOutput>,
    ) -> Result<(), StateError> {
        self.commit(|state| {
            state.provision.output = output;
            Ok(())
        })
        .await
    }

    /// Replace the configuration input wholesale, then persist.
    pub async fn set_configuration_input(
        &mut self,
        input: S::ConfigurationInput,
    ) -> Result<(), StateError> {
        self.commit(|state| {
            state.configuration.input = input;
            Ok(())
        })
        .await
    }

    /// Replace the configuration output, then persist. `None` clears it.
    pub async fn set_configuration_output(
        &mut self,
        output: Option<S::ConfigurationOutput>,
    ) -> Result<(), StateError> {
        self.commit(|state| {
            state.configuration.output = output;
            Ok(())
        })
        .await
    }

    /// Deep-merge `partial` into the provision input, then persist.
    ///
    /// Objects merge key-wise; primitives and arrays are replaced wholesale.
    /// Outputs are never merged; use [`Self::set_provision_output`]. Fails
    /// with `SchemaValidation` (nothing persisted, nothing committed) if the
    /// merged value no longer conforms to the typed input.
    pub async fn update_provision_input(&mut self, partial: Value) -> Result<(), StateError> {
        self.commit(|state| {
            state.provision.input = merged(&state.provision.input, partial, "provision.input")?;
            Ok(())
        })
        .await
    }

    /// Deep-merge `partial` into the configuration input, then persist.
    pub async fn update_configuration_input(&mut self, partial: Value) -> Result<(), StateError> {
        self.commit(|state| {
            state.configuration.input =
                merged(&state.configuration.input, partial, "configuration.input")?;
            Ok(())
        })
        .await
    }

    /// Record a lifecycle event, then persist.
    ///
    /// With the log at capacity, the entry with the globally oldest
    /// timestamp is evicted before the append: one sort pass happens at
    /// eviction time, and appends otherwise preserve insertion order.
    /// Consumers that need chronological order must sort on read.
    pub async fn add_event(
        &mut self,
        event_type: EventType,
        at: Option<DateTime<Utc>>,
    ) -> Result<(), StateError> {
        let timestamp = at.map_or_else(|| Utc::now().timestamp_millis(), |at| at.timestamp_millis());
        self.commit(|state| {
            let events = state.events.get_or_insert_with(Vec::new);
            if events.len() >= STATE_MAX_EVENTS {
                events.sort_by_key(|event| event.timestamp);
                let evicted = events.remove(0);
                tracing::debug!(
                    instance = %state.name,
                    evicted = ?evicted.event_type,
                    "event log full, dropped oldest entry"
                );
            }
            events.push(InstanceEvent {
                event_type,
                timestamp,
            });
            Ok(())
        })
        .await
    }

    /// Write the current in-memory state as-is. The in-memory reference is
    /// left untouched; it already equals what is written.
    pub async fn persist_state_now(&self) -> Result<(), StateError> {
        let state = self.state()?;
        self.persist(state).await
    }

    /// Delete the durable record for this instance.
    ///
    /// The in-memory state is deliberately retained so the last-known state
    /// of a decommissioned instance stays inspectable.
    pub async fn destroy_state(&self) -> Result<(), StateError> {
        let name = self.instance_name()?;
        self.backend.destroy_state(name).await?;
        tracing::info!(instance = name, "destroyed durable state");
        Ok(())
    }

    async fn commit<F>(&mut self, mutate: F) -> Result<(), StateError>
    where
        F: FnOnce(&mut InstanceState<S>) -> Result<(), StateError>,
    {
        let mut next = self.clone_state()?;
        mutate(&mut next)?;
        self.persist(&next).await?;
        self.state = Some(next);
        Ok(())
    }

    async fn persist(&self, state: &InstanceState<S>) -> Result<(), StateError> {
        let snapshot = serde_json::to_value(state).map_err(anyhow::Error::from)?;
        self.backend.persist_state(&state.name, &snapshot).await?;
        tracing::debug!(
            instance = %state.name,
            provider = S::PROVIDER,
            "persisted state snapshot"
        );
        Ok(())
    }
}

fn merged<T: Payload>(current: &T, partial: Value, field: &str) -> Result<T, StateError> {
    let mut value = serde_json::to_value(current).map_err(anyhow::Error::from)?;
    deep_merge(&mut value, partial);
    serde_json::from_value(value).map_err(|err| StateError::SchemaValidation {
        fields: vec![format!("{field}: {err}")],
    })
}
