use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{Client, NewClient};
use crate::error::{StoreError, StoreResult};
use crate::executor::Executor;
use crate::registry::RepositoryHandle;
use crate::repositories::AddressLinked;

/// Client Repository
pub struct ClientRepository {
    executor: Executor,
}

impl ClientRepository {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    /// Registry factory producing a repository bound to `executor`.
    pub fn factory(executor: Executor) -> RepositoryHandle {
        Arc::new(Self::new(executor))
    }

    pub async fn create(&self, client: &NewClient, address_id: Uuid) -> StoreResult<Client> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(StoreError::TransactionClosed)?;

        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO clients (id, name, surname, email, address_id) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(&client.name)
        .bind(&client.surname)
        .bind(&client.email)
        .bind(address_id)
        .execute(&mut **tx)
        .await?;

        Ok(Client {
            id,
            name: client.name.clone(),
            surname: client.surname.clone(),
            email: client.email.clone(),
            address_id,
        })
    }

    pub async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Client>> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(StoreError::TransactionClosed)?;

        let row = sqlx::query(
            "SELECT id, name, surname, email, address_id FROM clients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(row.map(|r| Client {
            id: r.get("id"),
            name: r.get("name"),
            surname: r.get("surname"),
            email: r.get("email"),
            address_id: r.get("address_id"),
        }))
    }

    pub async fn delete(&self, id: Uuid) -> StoreResult<u64> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(StoreError::TransactionClosed)?;

        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count(&self) -> StoreResult<i64> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(StoreError::TransactionClosed)?;

        let row = sqlx::query("SELECT COUNT(*) AS count FROM clients")
            .fetch_one(&mut **tx)
            .await?;
        Ok(row.get("count"))
    }
}

#[async_trait]
impl AddressLinked for ClientRepository {
    fn entity(&self) -> &'static str {
        "client"
    }

    async fn address_of(&self, id: Uuid) -> StoreResult<Option<Uuid>> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(StoreError::TransactionClosed)?;

        let row = sqlx::query("SELECT address_id FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(row.map(|r| r.get("address_id")))
    }

    async fn relink_address(&self, id: Uuid, address_id: Uuid) -> StoreResult<u64> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(StoreError::TransactionClosed)?;

        let result = sqlx::query("UPDATE clients SET address_id = $2 WHERE id = $1")
            .bind(id)
            .bind(address_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}
