use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Maximum number of lifecycle events retained per instance.
pub const STATE_MAX_EVENTS: usize = 10;

/// Loosely typed record used for payloads the caller does not need typed.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Bounds shared by every schema payload type.
pub trait Payload:
    Serialize + DeserializeOwned + Clone + fmt::Debug + PartialEq + Send + Sync + 'static
{
}

impl<T> Payload for T where
    T: Serialize + DeserializeOwned + Clone + fmt::Debug + PartialEq + Send + Sync + 'static
{
}

/// Provider-specific payload schema for the state envelope.
///
/// The envelope (`name`/`provision`/`configuration`/`events`) is the same
/// for every provider; the four payload shapes are not. Callers that do not
/// care about provider fields use [`AnonymousSchema`], which leaves all four
/// payloads as raw records.
pub trait ProviderSchema: Send + Sync + 'static {
    /// Provider code, e.g. `"scaleway"`. Logging only.
    const PROVIDER: &'static str;

    type ProvisionInput: Payload;
    type ProvisionOutput: Payload;
    type ConfigurationInput: Payload;
    type ConfigurationOutput: Payload;
}

/// Envelope-only schema: payloads stay untyped records.
#[derive(Debug, Clone, PartialEq)]
pub struct AnonymousSchema;

impl ProviderSchema for AnonymousSchema {
    const PROVIDER: &'static str = "anonymous";

    type ProvisionInput = RawRecord;
    type ProvisionOutput = RawRecord;
    type ConfigurationInput = RawRecord;
    type ConfigurationOutput = RawRecord;
}

/// One lifecycle step: the declarative input it was given and, once the
/// step has succeeded at least once, the output it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepState<I, O> {
    pub input: I,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<O>,
}

/// Durable record of one instance, keyed by its unique name.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "", deserialize = ""))]
pub struct InstanceState<S: ProviderSchema> {
    pub name: String,
    pub provision: StepState<S::ProvisionInput, S::ProvisionOutput>,
    pub configuration: StepState<S::ConfigurationInput, S::ConfigurationOutput>,
    /// Absent until the first event is recorded; never longer than
    /// [`STATE_MAX_EVENTS`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<InstanceEvent>>,
}

// Hand-written so the bound is `S: ProviderSchema` rather than the `S: Clone`
// a derive would demand: the schema type is a zero-sized marker, and the
// fields that actually get cloned are the `Payload` associated types, which
// are `Clone` by their own bound.
impl<S: ProviderSchema> Clone for InstanceState<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            provision: self.provision.clone(),
            configuration: self.configuration.clone(),
            events: self.events.clone(),
        }
    }
}

impl<S: ProviderSchema> InstanceState<S> {
    /// State as first created by a provisioning request: inputs only, no
    /// outputs, no events.
    pub fn new(
        name: impl Into<String>,
        provision_input: S::ProvisionInput,
        configuration_input: S::ConfigurationInput,
    ) -> Self {
        Self {
            name: name.into(),
            provision: StepState {
                input: provision_input,
                output: None,
            },
            configuration: StepState {
                input: configuration_input,
                output: None,
            },
            events: None,
        }
    }
}

/// Timestamped marker recording the start or end of a lifecycle step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Milliseconds since epoch.
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ProvisionBegin,
    ProvisionEnd,
    ConfigurationBegin,
    ConfigurationEnd,
    StartBegin,
    StartEnd,
    StopBegin,
    StopEnd,
    DestroyBegin,
    DestroyEnd,
}

/// Provider-agnostic subset every configuration input shares.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommonConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_stop: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_types_serialize_snake_case() {
        let value = serde_json::to_value(EventType::ProvisionBegin).unwrap();
        assert_eq!(value, serde_json::json!("provision_begin"));
        let value = serde_json::to_value(EventType::DestroyEnd).unwrap();
        assert_eq!(value, serde_json::json!("destroy_end"));
    }

    #[test]
    fn absent_output_and_events_are_omitted_on_the_wire() {
        let state = InstanceState::<AnonymousSchema>::new("worker-1", RawRecord::new(), RawRecord::new());
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "name": "worker-1",
                "provision": {"input": {}},
                "configuration": {"input": {}},
            })
        );
    }
}
