use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;

use anchorage_state::StateBackend;

const STATE_FILE: &str = "state.json";
const DEFAULT_ROOT: &str = ".anchorage/state";

/// One directory per instance under a root directory, with the snapshot at
/// `<root>/<name>/state.json`.
///
/// A persist writes a uuid-suffixed temp file in the instance directory and
/// renames it into place, so the snapshot on disk is always either the old
/// one or the new one. `destroy_state` removes the whole instance directory,
/// including any instance-scoped files placed next to the snapshot.
pub struct LocalFileBackend {
    root: PathBuf,
}

impl LocalFileBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root from `ANCHORAGE_STATE_ROOT`, falling back to `.anchorage/state`.
    pub fn from_env() -> Self {
        let root = std::env::var("ANCHORAGE_STATE_ROOT")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_ROOT.to_string());
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn instance_dir(&self, name: &str) -> Result<PathBuf> {
        // Instance names become directory names; keep them from escaping
        // the storage root.
        if name.is_empty() || name == "." || name == ".." || name.contains('/') || name.contains('\\') {
            bail!("invalid instance name '{name}'");
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl StateBackend for LocalFileBackend {
    async fn persist_state(&self, name: &str, state: &Value) -> Result<()> {
        let dir = self.instance_dir(name)?;
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("could not create state directory {}", dir.display()))?;

        let body = serde_json::to_vec_pretty(state)?;
        let path = dir.join(STATE_FILE);
        let tmp = dir.join(format!("{STATE_FILE}.{}", uuid::Uuid::new_v4()));
        fs::write(&tmp, &body)
            .await
            .with_context(|| format!("could not write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("could not move snapshot into place at {}", path.display()))?;
        tracing::debug!(instance = name, path = %path.display(), "persisted snapshot");
        Ok(())
    }

    async fn load_raw_state(&self, name: &str) -> Result<Option<Value>> {
        let path = self.instance_dir(name)?.join(STATE_FILE);
        let body = match fs::read(&path).await {
            Ok(body) => body,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("could not read {}", path.display()))
            }
        };
        let raw = serde_json::from_slice(&body)
            .with_context(|| format!("snapshot at {} is not valid JSON", path.display()))?;
        Ok(Some(raw))
    }

    async fn destroy_state(&self, name: &str) -> Result<()> {
        let dir = self.instance_dir(name)?;
        match fs::remove_dir_all(&dir).await {
            Ok(()) => {
                tracing::info!(instance = name, "removed instance storage");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("could not remove {}", dir.display())),
        }
    }
}
