use thiserror::Error;

/// Error taxonomy of the catalog store.
///
/// Validation rejections leave the collection untouched; gateway failures
/// leave it at its last known-good value. Nothing here is a crash path, and
/// nothing retries automatically.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("record name must not be empty")]
    EmptyName,

    #[error("no record with id '{0}'")]
    NotFound(String),

    #[error("record '{id}' is a seed record and cannot be {operation}")]
    SeedProtected {
        id: String,
        operation: &'static str,
    },

    #[error("persistence gateway failure: {0}")]
    Gateway(anyhow::Error),
}
