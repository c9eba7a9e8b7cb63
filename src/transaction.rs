use std::any::type_name;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{StoreError, StoreResult};
use crate::executor::Executor;
use crate::registry::RepositoryFactory;

/// Per-transaction handle through which work closures resolve repositories.
///
/// A context wraps exactly one live transaction plus a snapshot of the
/// registry taken when [`UnitOfWork::run`](crate::UnitOfWork::run) began.
/// Repositories resolved through it are bound to that transaction and must
/// not be used after `run` returns.
#[derive(Clone)]
pub struct TransactionContext {
    executor: Executor,
    factories: Arc<HashMap<String, RepositoryFactory>>,
}

impl TransactionContext {
    pub(crate) fn new(
        executor: Executor,
        factories: Arc<HashMap<String, RepositoryFactory>>,
    ) -> Self {
        Self {
            executor,
            factories,
        }
    }

    /// Look up the factory registered under `name`.
    pub fn generator(&self, name: &str) -> StoreResult<RepositoryFactory> {
        self.factories
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotRegistered(name.to_string()))
    }

    /// Resolve the repository registered under `name`, bound to this
    /// transaction.
    ///
    /// The factory output is checked against the repository type the call
    /// site expects; a mismatch means the name was wired to a different
    /// repository and fails with [`StoreError::RepositoryConversion`].
    pub fn resolve<R>(&self, name: &str) -> StoreResult<Arc<R>>
    where
        R: Send + Sync + 'static,
    {
        let factory = self.generator(name)?;
        factory.as_ref()(self.executor.clone())
            .downcast::<R>()
            .map_err(|_| StoreError::RepositoryConversion {
                name: name.to_string(),
                expected: type_name::<R>(),
            })
    }

    /// The executor for this transaction, for ad-hoc statements such as
    /// savepoint management.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }
}
