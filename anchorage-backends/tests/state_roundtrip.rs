//! End-to-end lifecycle coverage: writer + parser + concrete backends.

use std::sync::Arc;

use anchorage_backends::{LocalFileBackend, MemoryBackend};
use anchorage_providers::scaleway::{
    ScalewayConfigurationInput, ScalewayProvisionInput, ScalewayProvisionOutput, ScalewaySchema,
};
use anchorage_state::{
    AnonymousSchema, EventType, InstanceState, RawRecord, StateError, StateLoader, StateWriter,
};
use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;

fn scaleway_state(name: &str) -> InstanceState<ScalewaySchema> {
    InstanceState::new(
        name,
        ScalewayProvisionInput {
            zone: "fr-par-2".to_string(),
            commercial_type: "L4-1-24G".to_string(),
            image_id: "ubuntu-22.04".to_string(),
            tags: vec!["anchorage".to_string()],
            data_volume_size_gb: Some(200),
        },
        ScalewayConfigurationInput {
            auto_stop: Some(true),
            ssh_user: Some("root".to_string()),
            cloud_init: None,
        },
    )
}

fn record(value: serde_json::Value) -> RawRecord {
    value.as_object().cloned().unwrap()
}

fn at(millis: i64) -> Option<DateTime<Utc>> {
    Some(Utc.timestamp_millis_opt(millis).unwrap())
}

#[tokio::test]
async fn scaleway_lifecycle_round_trips_through_the_file_backend() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(LocalFileBackend::new(dir.path()));

    let mut writer = StateWriter::<ScalewaySchema>::new(backend.clone());
    writer.set_state(scaleway_state("worker-7"));
    writer.add_event(EventType::ProvisionBegin, at(1_000)).await.unwrap();
    writer
        .set_provision_output(Some(ScalewayProvisionOutput {
            server_id: "4f5a1c2e".to_string(),
            zone: "fr-par-2".to_string(),
            ip_address: Some("51.15.0.8".to_string()),
            boot_volume_id: None,
        }))
        .await
        .unwrap();
    writer.add_event(EventType::ProvisionEnd, at(2_000)).await.unwrap();

    // A fresh loader (think: process restart) sees exactly what we wrote.
    let loader = StateLoader::new(backend.clone());
    let reloaded = loader.load::<ScalewaySchema>("worker-7").await.unwrap();
    assert_eq!(&reloaded, writer.state().unwrap());

    // The anonymous path reads the same record without provider types.
    let envelope = loader.load::<AnonymousSchema>("worker-7").await.unwrap();
    assert_eq!(envelope.name, "worker-7");
    assert_eq!(
        envelope.provision.output.as_ref().and_then(|o| o.get("server_id")),
        Some(&json!("4f5a1c2e"))
    );
}

#[tokio::test]
async fn loaded_writer_continues_the_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(LocalFileBackend::new(dir.path()));

    let mut writer = StateWriter::<ScalewaySchema>::new(backend.clone());
    writer.set_state(scaleway_state("worker-9"));
    writer.persist_state_now().await.unwrap();
    drop(writer);

    let loader = StateLoader::new(backend.clone());
    let mut writer = loader.load_writer::<ScalewaySchema>("worker-9").await.unwrap();
    writer
        .update_configuration_input(json!({"cloud_init": "#cloud-config\n"}))
        .await
        .unwrap();

    let reloaded = loader.load::<ScalewaySchema>("worker-9").await.unwrap();
    assert_eq!(
        reloaded.configuration.input.cloud_init.as_deref(),
        Some("#cloud-config\n")
    );
    // Merge kept the sibling fields.
    assert_eq!(reloaded.configuration.input.auto_stop, Some(true));
}

#[tokio::test]
async fn event_window_spans_the_ten_most_recent_timestamps() {
    let backend = Arc::new(MemoryBackend::new());
    let mut writer = StateWriter::<AnonymousSchema>::new(backend.clone());
    writer.set_state(InstanceState::new(
        "x",
        record(json!({"size": 1})),
        record(json!({})),
    ));

    let t0 = 1_700_000_000_000_i64;
    for i in 0..10 {
        writer
            .add_event(EventType::ProvisionBegin, at(t0 + i))
            .await
            .unwrap();
    }
    writer
        .add_event(EventType::ProvisionBegin, at(t0 + 10))
        .await
        .unwrap();

    let loader = StateLoader::new(backend);
    let state = loader.load::<AnonymousSchema>("x").await.unwrap();
    let timestamps: Vec<i64> = state
        .events
        .unwrap()
        .iter()
        .map(|event| event.timestamp)
        .collect();
    assert_eq!(timestamps, (1..11).map(|i| t0 + i).collect::<Vec<_>>());
}

#[tokio::test]
async fn destroyed_instances_are_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(LocalFileBackend::new(dir.path()));

    let mut writer = StateWriter::<ScalewaySchema>::new(backend.clone());
    writer.set_state(scaleway_state("worker-11"));
    writer.persist_state_now().await.unwrap();
    writer.destroy_state().await.unwrap();

    let loader = StateLoader::new(backend);
    match loader.load_raw("worker-11").await {
        Err(StateError::NotFound(name)) => assert_eq!(name, "worker-11"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}
