use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Durable storage boundary for instance state snapshots.
///
/// One snapshot per instance name, replaced wholesale on every write. Each
/// call must appear atomic to the caller (no partially written snapshot
/// observable) and be idempotent for the same input. The contract provides
/// no locking and no version check: a given instance name is assumed to
/// have a single owner at a time, and concurrent writers race on
/// last-persist-wins.
#[async_trait]
pub trait StateBackend: Send + Sync {
    /// Durably write the full snapshot for `name`, replacing any prior one.
    async fn persist_state(&self, name: &str, state: &Value) -> Result<()>;

    /// Last persisted snapshot for `name`, or `None` if none exists.
    async fn load_raw_state(&self, name: &str) -> Result<Option<Value>>;

    /// Delete the snapshot and any instance-scoped storage for `name`.
    async fn destroy_state(&self, name: &str) -> Result<()>;
}
