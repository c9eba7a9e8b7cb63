use std::future::Future;

use crate::error::{StoreError, StoreResult};
use crate::executor::Executor;

/// Result of a [`safe_delete`] attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The row was deleted.
    Deleted,
    /// The row is still referenced by another table and was left in place.
    SkippedStillReferenced,
}

/// A named rollback point inside one transaction.
///
/// Savepoint names are restricted to identifier characters so they can be
/// spliced into the statement safely. The savepoint is released implicitly
/// when the enclosing transaction commits.
pub struct Savepoint<'a> {
    executor: &'a Executor,
    name: String,
}

impl<'a> Savepoint<'a> {
    /// Issue `SAVEPOINT <name>` on the current transaction.
    pub async fn begin(executor: &'a Executor, name: &str) -> StoreResult<Savepoint<'a>> {
        if !is_valid_name(name) {
            return Err(StoreError::InvalidSavepointName(name.to_string()));
        }
        executor
            .execute_raw(&format!("SAVEPOINT {name}"))
            .await
            .map_err(|e| match e {
                StoreError::Database(source) => StoreError::SavepointSetup {
                    name: name.to_string(),
                    source,
                },
                other => other,
            })?;
        Ok(Self {
            executor,
            name: name.to_string(),
        })
    }

    /// Undo everything executed since this savepoint, keeping the
    /// enclosing transaction alive.
    pub async fn rollback_to(&self) -> StoreResult<()> {
        self.executor
            .execute_raw(&format!("ROLLBACK TO SAVEPOINT {}", self.name))
            .await
            .map_err(|e| match e {
                StoreError::Database(source) => StoreError::SavepointRollback {
                    name: self.name.clone(),
                    source,
                },
                other => other,
            })
    }

    /// Discard the savepoint without rolling back.
    pub async fn release(self) -> StoreResult<()> {
        self.executor
            .execute_raw(&format!("RELEASE SAVEPOINT {}", self.name))
            .await
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Attempt a delete that may be blocked by a foreign key reference.
///
/// The delete runs under a savepoint. When the database rejects it with a
/// foreign key violation, only the failed delete is undone and the outcome
/// is [`DeleteOutcome::SkippedStillReferenced`]; the rest of the
/// transaction's writes are preserved. Any other delete failure leaves the
/// transaction for the enclosing [`UnitOfWork::run`](crate::UnitOfWork::run)
/// to roll back wholesale.
///
/// Shared rows (addresses referenced by several suppliers, images still
/// linked to a product) are garbage-collected this way: the delete is
/// attempted and the constraint decides whether the row is still needed.
pub async fn safe_delete<F, Fut>(
    executor: &Executor,
    savepoint_name: &str,
    entity: &'static str,
    delete_fn: F,
) -> StoreResult<DeleteOutcome>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = StoreResult<()>>,
{
    let savepoint = Savepoint::begin(executor, savepoint_name).await?;
    match delete_fn().await {
        // Savepoint stays in place; the enclosing commit releases it.
        Ok(()) => Ok(DeleteOutcome::Deleted),
        Err(e) if e.is_foreign_key_violation() => {
            savepoint.rollback_to().await?;
            tracing::debug!(
                entity,
                savepoint = savepoint.name(),
                "delete skipped, row still referenced"
            );
            Ok(DeleteOutcome::SkippedStillReferenced)
        }
        Err(StoreError::Database(source)) => Err(StoreError::DeleteRejected { entity, source }),
        Err(other) => Err(other),
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
