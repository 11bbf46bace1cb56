use thiserror::Error;

/// Errors that point at a bug in a collaborator (bad catalog, bad corpus)
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("duplicate record id `{0}` in corpus")]
    DuplicateId(String),

    #[error("invalid shortcut `{prefix}`: {reason}")]
    InvalidShortcut {
        prefix: String,
        reason: &'static str,
    },

    #[error("failed to parse {what}: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// History persistence failures; callers log these and carry on
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("stored history is malformed: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("storage backend error: {0}")]
    Backend(String),
}
