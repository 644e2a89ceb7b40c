//! Repository errors

use gk_core::GkError;

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt row in {table}: {message}")]
    CorruptRow { table: &'static str, message: String },
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<RepositoryError> for GkError {
    fn from(err: RepositoryError) -> Self {
        tracing::error!(error = %err, "Repository failure");
        GkError::Database(err.to_string())
    }
}
