use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{StoreError, StoreResult};
use crate::executor::Executor;

/// A repository as stored in the registry: an opaque object downcast to its
/// concrete type at the resolution site.
pub type RepositoryHandle = Arc<dyn Any + Send + Sync>;

/// Factory producing a repository bound to the given transaction executor.
///
/// Factories are stateless and invoked once per repository per transaction.
pub type RepositoryFactory = Arc<dyn Fn(Executor) -> RepositoryHandle + Send + Sync>;

/// Maps logical repository names to their factories.
///
/// The registry is owned by a [`UnitOfWork`](crate::UnitOfWork) and is
/// typically populated once at startup. Mutation is guarded so a concurrent
/// registration cannot race an in-flight transaction; each transaction works
/// against a snapshot taken when it begins.
#[derive(Default)]
pub struct Registry {
    factories: RwLock<HashMap<String, RepositoryFactory>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `name`.
    ///
    /// Fails if the name is already taken; re-registering requires an
    /// explicit [`remove`](Self::remove) first.
    pub fn register<F>(&self, name: &str, factory: F) -> StoreResult<()>
    where
        F: Fn(Executor) -> RepositoryHandle + Send + Sync + 'static,
    {
        let mut factories = self.factories.write();
        if factories.contains_key(name) {
            return Err(StoreError::AlreadyRegistered(name.to_string()));
        }
        factories.insert(name.to_string(), Arc::new(factory));
        Ok(())
    }

    /// Remove the factory registered under `name`.
    pub fn remove(&self, name: &str) -> StoreResult<()> {
        match self.factories.write().remove(name) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotRegistered(name.to_string())),
        }
    }

    /// Drop all registered factories.
    pub fn clear(&self) {
        self.factories.write().clear();
    }

    /// Look up the factory registered under `name`.
    pub fn get(&self, name: &str) -> StoreResult<RepositoryFactory> {
        self.factories
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotRegistered(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.factories.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.read().is_empty()
    }

    /// Immutable view of the current contents, captured per transaction.
    pub(crate) fn snapshot(&self) -> Arc<HashMap<String, RepositoryFactory>> {
        Arc::new(self.factories.read().clone())
    }
}
