use std::time::Duration;
use thiserror::Error;

/// Failures surfaced by the persistence collaborators.
///
/// `EditConflict` and `DuplicateIdentity` are deliberately separate: the first
/// means another writer advanced the version, the second is a unique-key
/// violation that happens regardless of concurrency.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("edit conflict: record was modified by another request")]
    EditConflict,

    #[error("duplicate value for unique field `{field}`")]
    DuplicateIdentity { field: &'static str },

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("{operation} failed: {source}")]
    Unavailable {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl StoreError {
    /// Timeouts and backend failures; callers map these to 5xx.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            StoreError::Timeout { .. } | StoreError::Unavailable { .. }
        )
    }
}
