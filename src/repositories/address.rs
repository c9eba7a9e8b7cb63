use sqlx::Row;
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{Address, NewAddress};
use crate::error::{StoreError, StoreResult};
use crate::executor::Executor;
use crate::registry::RepositoryHandle;

/// Address Repository
///
/// Address rows are shared: several clients and suppliers may reference the
/// same `(country, city, street)` row, so writes insert-or-reuse by that
/// natural key and deletion is left to the savepoint-based helper.
pub struct AddressRepository {
    executor: Executor,
}

impl AddressRepository {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    /// Registry factory producing a repository bound to `executor`.
    pub fn factory(executor: Executor) -> RepositoryHandle {
        Arc::new(Self::new(executor))
    }

    /// Insert an address row for the natural key, or return the existing one.
    pub async fn insert_or_get(&self, address: &NewAddress) -> StoreResult<Address> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(StoreError::TransactionClosed)?;

        sqlx::query(
            "INSERT INTO addresses (id, country, city, street) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (country, city, street) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(&address.country)
        .bind(&address.city)
        .bind(&address.street)
        .execute(&mut **tx)
        .await?;

        let row = sqlx::query(
            "SELECT id, country, city, street FROM addresses \
             WHERE country = $1 AND city = $2 AND street = $3",
        )
        .bind(&address.country)
        .bind(&address.city)
        .bind(&address.street)
        .fetch_one(&mut **tx)
        .await?;

        Ok(Address {
            id: row.get("id"),
            country: row.get("country"),
            city: row.get("city"),
            street: row.get("street"),
        })
    }

    pub async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Address>> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(StoreError::TransactionClosed)?;

        let row = sqlx::query("SELECT id, country, city, street FROM addresses WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(row.map(|r| Address {
            id: r.get("id"),
            country: r.get("country"),
            city: r.get("city"),
            street: r.get("street"),
        }))
    }

    /// Delete an address row, returning the number of rows removed.
    ///
    /// A foreign key rejection surfaces as a database error; callers that
    /// want to tolerate it wrap this call in
    /// [`safe_delete`](crate::savepoint::safe_delete).
    pub async fn delete(&self, id: Uuid) -> StoreResult<u64> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(StoreError::TransactionClosed)?;

        let result = sqlx::query("DELETE FROM addresses WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count(&self) -> StoreResult<i64> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(StoreError::TransactionClosed)?;

        let row = sqlx::query("SELECT COUNT(*) AS count FROM addresses")
            .fetch_one(&mut **tx)
            .await?;
        Ok(row.get("count"))
    }
}
