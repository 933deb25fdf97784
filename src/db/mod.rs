// Storage layer support types.
//
// The code store and the membership directory are consumed through traits
// (see `crate::codes::store` and `crate::directory`), so their failure type
// lives here rather than leaking `sqlx::Error` through the seams.

use thiserror::Error;

/// Infrastructure failure from a backing store.
///
/// Distinct from the domain errors in `crate::codes::error`: a `StoreError`
/// means the lookup/write itself failed, not that the data disproved a
/// precondition.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage error: {0}")]
    Other(String),
}
