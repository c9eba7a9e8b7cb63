/// Postgres SQLSTATE for a foreign key constraint violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Error type covering the unit-of-work protocol, repository resolution
/// and the savepoint-based delete helper.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Repository '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("Repository '{0}' is not registered")]
    NotRegistered(String),

    #[error("Repository '{name}' does not provide the expected capability '{expected}'")]
    RepositoryConversion { name: String, expected: &'static str },

    #[error("Failed to begin transaction: {0}")]
    BeginFailed(#[source] sqlx::Error),

    #[error("Failed to commit transaction: {0}")]
    CommitFailed(#[source] sqlx::Error),

    #[error("Failed to roll back transaction: {source} (while handling: {cause})")]
    RollbackFailed {
        #[source]
        source: sqlx::Error,
        cause: Box<StoreError>,
    },

    #[error("Failed to set savepoint '{name}': {source}")]
    SavepointSetup {
        name: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to roll back to savepoint '{name}': {source}")]
    SavepointRollback {
        name: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Invalid savepoint name '{0}'")]
    InvalidSavepointName(String),

    #[error("Failed to delete {entity}: {source}")]
    DeleteRejected {
        entity: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Transaction is already committed or rolled back")]
    TransactionClosed,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type used throughout the crate.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Whether this error is the database rejecting a write that would break
    /// a referential-integrity constraint.
    pub fn is_foreign_key_violation(&self) -> bool {
        match self {
            StoreError::Database(e) | StoreError::DeleteRejected { source: e, .. } => {
                sqlx_is_foreign_key_violation(e)
            }
            _ => false,
        }
    }
}

/// Classify an sqlx error as a Postgres foreign key violation.
pub(crate) fn sqlx_is_foreign_key_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION),
        _ => false,
    }
}
