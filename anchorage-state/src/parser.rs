//! Pure validation and typing of raw persisted records.
//!
//! Envelope validation runs first and collects every offending field before
//! failing, so malformed snapshots surface all their problems in one error.
//! The payload pass then types the four provision/configuration sections
//! against the chosen [`ProviderSchema`]; with [`AnonymousSchema`] the
//! payloads are raw records and that pass accepts any object.
//!
//! [`AnonymousSchema`]: crate::model::AnonymousSchema

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::StateError;
use crate::model::{
    CommonConfiguration, EventType, InstanceEvent, InstanceState, ProviderSchema, StepState,
    STATE_MAX_EVENTS,
};

/// Parse a raw snapshot into a typed state, validating the envelope and the
/// provider payload shapes. No side effects.
pub fn parse_state<S: ProviderSchema>(raw: &Value) -> Result<InstanceState<S>, StateError> {
    let mut fields = Vec::new();
    validate_envelope(raw, &mut fields);
    if !fields.is_empty() {
        return Err(StateError::SchemaValidation { fields });
    }

    let provision_input =
        typed::<S::ProvisionInput>(&raw["provision"]["input"], "provision.input", &mut fields);
    let provision_output = typed_optional::<S::ProvisionOutput>(
        &raw["provision"],
        "output",
        "provision.output",
        &mut fields,
    );
    let configuration_input = typed::<S::ConfigurationInput>(
        &raw["configuration"]["input"],
        "configuration.input",
        &mut fields,
    );
    let configuration_output = typed_optional::<S::ConfigurationOutput>(
        &raw["configuration"],
        "output",
        "configuration.output",
        &mut fields,
    );
    let events = typed_optional::<Vec<InstanceEvent>>(raw, "events", "events", &mut fields);

    if !fields.is_empty() {
        return Err(StateError::SchemaValidation { fields });
    }

    // The pushes above guarantee every section parsed when fields is empty.
    match (
        provision_input,
        provision_output,
        configuration_input,
        configuration_output,
        events,
    ) {
        (Some(input), Some(output), Some(cfg_input), Some(cfg_output), Some(events)) => {
            Ok(InstanceState {
                name: raw["name"].as_str().unwrap_or_default().to_string(),
                provision: StepState { input, output },
                configuration: StepState {
                    input: cfg_input,
                    output: cfg_output,
                },
                events,
            })
        }
        _ => Err(StateError::invalid_field("state")),
    }
}

/// Provider-agnostic read of the shared configuration subset.
///
/// Accepts any configuration input record; only the common fields are
/// typed, everything else is ignored.
pub fn parse_common_configuration(input: &Value) -> Result<CommonConfiguration, StateError> {
    if !input.is_object() {
        return Err(StateError::invalid_field("configuration.input"));
    }
    serde_json::from_value(input.clone())
        .map_err(|_| StateError::invalid_field("configuration.input.auto_stop"))
}

fn typed<T: DeserializeOwned>(value: &Value, field: &str, fields: &mut Vec<String>) -> Option<T> {
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            fields.push(format!("{field}: {err}"));
            None
        }
    }
}

/// `None`/null means "not produced yet", which is valid; anything else must
/// parse as `T`. The outer `Option` distinguishes "valid" from "offending".
fn typed_optional<T: DeserializeOwned>(
    parent: &Value,
    key: &str,
    field: &str,
    fields: &mut Vec<String>,
) -> Option<Option<T>> {
    match parent.get(key) {
        None | Some(Value::Null) => Some(None),
        Some(value) => typed(value, field, fields).map(Some),
    }
}

fn validate_envelope(raw: &Value, fields: &mut Vec<String>) {
    let Some(root) = raw.as_object() else {
        fields.push("expected a top-level object".to_string());
        return;
    };

    match root.get("name") {
        Some(Value::String(name)) if !name.is_empty() => {}
        _ => fields.push("name".to_string()),
    }

    for step in ["provision", "configuration"] {
        match root.get(step) {
            Some(Value::Object(section)) => {
                if !matches!(section.get("input"), Some(Value::Object(_))) {
                    fields.push(format!("{step}.input"));
                }
                match section.get("output") {
                    None | Some(Value::Null) | Some(Value::Object(_)) => {}
                    Some(_) => fields.push(format!("{step}.output")),
                }
            }
            _ => fields.push(step.to_string()),
        }
    }

    match root.get("events") {
        None | Some(Value::Null) => {}
        Some(Value::Array(events)) => {
            if events.len() > STATE_MAX_EVENTS {
                fields.push(format!(
                    "events: {} entries exceed the limit of {}",
                    events.len(),
                    STATE_MAX_EVENTS
                ));
            }
            for (index, event) in events.iter().enumerate() {
                let Some(event) = event.as_object() else {
                    fields.push(format!("events[{index}]"));
                    continue;
                };
                let valid_type = event
                    .get("type")
                    .is_some_and(|kind| serde_json::from_value::<EventType>(kind.clone()).is_ok());
                if !valid_type {
                    fields.push(format!("events[{index}].type"));
                }
                if !matches!(event.get("timestamp"), Some(Value::Number(n)) if n.is_i64()) {
                    fields.push(format!("events[{index}].timestamp"));
                }
            }
        }
        Some(_) => fields.push("events".to_string()),
    }
}
