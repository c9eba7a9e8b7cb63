use sqlx::{Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{StoreError, StoreResult};

/// Executor wraps a live database transaction for use by repositories.
///
/// Every repository materialized for one unit of work shares the same
/// executor, so all of their statements run on the same transaction.
#[derive(Clone, Debug)]
pub struct Executor {
    pub tx: Arc<Mutex<Option<Transaction<'static, Postgres>>>>,
}

impl Executor {
    /// Creates a new Executor from a PostgreSQL transaction.
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
        }
    }

    /// Takes ownership of the transaction, leaving None in its place.
    /// This should only be called when committing or rolling back.
    pub(crate) async fn take_transaction(&self) -> StoreResult<Transaction<'static, Postgres>> {
        self.tx
            .lock()
            .await
            .take()
            .ok_or(StoreError::TransactionClosed)
    }

    /// Run a single ad-hoc statement on the wrapped transaction.
    ///
    /// Used for savepoint management; repositories go through their own
    /// typed methods instead.
    pub(crate) async fn execute_raw(&self, sql: &str) -> StoreResult<()> {
        let mut tx_guard = self.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(StoreError::TransactionClosed)?;
        sqlx::query(sql).execute(&mut **tx).await?;
        Ok(())
    }
}
