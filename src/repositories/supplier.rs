use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{NewSupplier, Supplier};
use crate::error::{StoreError, StoreResult};
use crate::executor::Executor;
use crate::registry::RepositoryHandle;
use crate::repositories::AddressLinked;

/// Supplier Repository
pub struct SupplierRepository {
    executor: Executor,
}

impl SupplierRepository {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    /// Registry factory producing a repository bound to `executor`.
    pub fn factory(executor: Executor) -> RepositoryHandle {
        Arc::new(Self::new(executor))
    }

    pub async fn create(&self, supplier: &NewSupplier, address_id: Uuid) -> StoreResult<Supplier> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(StoreError::TransactionClosed)?;

        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO suppliers (id, name, phone, address_id) VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(&supplier.name)
        .bind(&supplier.phone)
        .bind(address_id)
        .execute(&mut **tx)
        .await?;

        Ok(Supplier {
            id,
            name: supplier.name.clone(),
            phone: supplier.phone.clone(),
            address_id,
        })
    }

    pub async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Supplier>> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(StoreError::TransactionClosed)?;

        let row = sqlx::query("SELECT id, name, phone, address_id FROM suppliers WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(row.map(|r| Supplier {
            id: r.get("id"),
            name: r.get("name"),
            phone: r.get("phone"),
            address_id: r.get("address_id"),
        }))
    }

    pub async fn delete(&self, id: Uuid) -> StoreResult<u64> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(StoreError::TransactionClosed)?;

        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count(&self) -> StoreResult<i64> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(StoreError::TransactionClosed)?;

        let row = sqlx::query("SELECT COUNT(*) AS count FROM suppliers")
            .fetch_one(&mut **tx)
            .await?;
        Ok(row.get("count"))
    }
}

#[async_trait]
impl AddressLinked for SupplierRepository {
    fn entity(&self) -> &'static str {
        "supplier"
    }

    async fn address_of(&self, id: Uuid) -> StoreResult<Option<Uuid>> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(StoreError::TransactionClosed)?;

        let row = sqlx::query("SELECT address_id FROM suppliers WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(row.map(|r| r.get("address_id")))
    }

    async fn relink_address(&self, id: Uuid, address_id: Uuid) -> StoreResult<u64> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(StoreError::TransactionClosed)?;

        let result = sqlx::query("UPDATE suppliers SET address_id = $2 WHERE id = $1")
            .bind(id)
            .bind(address_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}
