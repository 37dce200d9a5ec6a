use thiserror::Error;

/// Error taxonomy of the state store.
///
/// Backend failures are propagated verbatim inside [`StateError::Persistence`];
/// the store performs no translation and no internal retries.
#[derive(Debug, Error)]
pub enum StateError {
    /// A writer method was called before `set_state`. A programming error,
    /// never retried.
    #[error("state writer has no state loaded")]
    Uninitialized,

    /// The backend holds no record for the requested instance name.
    #[error("no persisted state for instance '{0}'")]
    NotFound(String),

    /// Raw persisted data (or a deep-merge result) does not conform to the
    /// expected envelope or provider schema. Retrying cannot help.
    #[error("state does not match the expected schema: {}", fields.join("; "))]
    SchemaValidation { fields: Vec<String> },

    /// The backend's write or delete failed. The in-memory state is
    /// guaranteed unchanged; callers may retry the same mutation.
    #[error("state persistence failed: {0:#}")]
    Persistence(#[from] anyhow::Error),
}

impl StateError {
    /// Shorthand for a single-field schema failure.
    pub(crate) fn invalid_field(field: impl Into<String>) -> Self {
        StateError::SchemaValidation {
            fields: vec![field.into()],
        }
    }
}
