use sqlx::PgPool;
use std::future::Future;
use std::sync::Arc;

use crate::error::{StoreError, StoreResult};
use crate::executor::Executor;
use crate::registry::Registry;
use crate::transaction::TransactionContext;

/// Unit of Work coordinating multi-repository writes on one transaction.
///
/// The unit of work owns the connection pool and the repository registry.
/// Each [`run`](Self::run) call checks out a connection, begins a
/// transaction, hands the work closure a [`TransactionContext`] for
/// repository resolution, and commits or rolls back based on the closure's
/// result. Exactly one of commit or rollback happens per invocation.
pub struct UnitOfWork {
    pool: Arc<PgPool>,
    registry: Registry,
}

impl UnitOfWork {
    /// Create a unit of work with an empty registry.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self::with_registry(pool, Registry::new())
    }

    /// Create a unit of work over a pre-populated registry.
    pub fn with_registry(pool: Arc<PgPool>, registry: Registry) -> Self {
        Self { pool, registry }
    }

    /// The repository registry, for composition-time wiring.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run `work` inside a single database transaction.
    ///
    /// Begins a transaction (failing with [`StoreError::BeginFailed`] before
    /// `work` is ever invoked), builds a [`TransactionContext`] over the
    /// current registry contents, and awaits `work`. An `Ok` return commits;
    /// an `Err` return rolls back and surfaces the error. If rollback itself
    /// fails, the returned [`StoreError::RollbackFailed`] carries both the
    /// rollback error and the original cause.
    ///
    /// No retry happens at this layer; callers re-invoke `run` for a fresh
    /// attempt. Nested `run` calls are unsupported: the inner call would
    /// check out a second connection and its writes would not participate in
    /// the outer transaction. If `work` panics, the transaction guard is
    /// dropped and the server discards the transaction.
    pub async fn run<T, W, Fut>(&self, work: W) -> StoreResult<T>
    where
        W: FnOnce(TransactionContext) -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        let tx = self.pool.begin().await.map_err(StoreError::BeginFailed)?;
        let executor = Executor::new(tx);
        let ctx = TransactionContext::new(executor.clone(), self.registry.snapshot());

        match work(ctx).await {
            Ok(value) => {
                let tx = executor.take_transaction().await?;
                tx.commit().await.map_err(StoreError::CommitFailed)?;
                Ok(value)
            }
            Err(cause) => {
                let tx = match executor.take_transaction().await {
                    Ok(tx) => tx,
                    // The transaction is already gone; nothing left to roll
                    // back, so the work error stands on its own.
                    Err(_) => return Err(cause),
                };
                if let Err(source) = tx.rollback().await {
                    tracing::error!(
                        error = %cause,
                        rollback_error = %source,
                        "failed to roll back after work error"
                    );
                    return Err(StoreError::RollbackFailed {
                        source,
                        cause: Box::new(cause),
                    });
                }
                tracing::debug!(error = %cause, "transaction rolled back");
                Err(cause)
            }
        }
    }
}
