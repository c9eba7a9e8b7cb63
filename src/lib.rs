//! Store Unit of Work Module
//!
//! Transactional persistence core for a home-appliance-store backend. A
//! [`UnitOfWork`] owns the connection pool and a named [`Registry`] of
//! repository factories; each [`UnitOfWork::run`] call materializes
//! repositories bound to one transaction and commits or rolls back as a
//! whole. Shared rows (addresses, images) are garbage collected with a
//! savepoint-based [`safe_delete`] that tolerates foreign key references.

pub mod entities;
pub mod error;
pub mod executor;
pub mod registry;
pub mod repositories;
pub mod savepoint;
pub mod services;
pub mod transaction;
pub mod unit_of_work;

pub use error::{StoreError, StoreResult};
pub use executor::Executor;
pub use registry::{Registry, RepositoryFactory, RepositoryHandle};
pub use savepoint::{safe_delete, DeleteOutcome, Savepoint};
pub use transaction::TransactionContext;
pub use unit_of_work::UnitOfWork;
