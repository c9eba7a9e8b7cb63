use sqlx::Row;
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{Image, NewImage};
use crate::error::{StoreError, StoreResult};
use crate::executor::Executor;
use crate::registry::RepositoryHandle;

/// Image Repository
pub struct ImageRepository {
    executor: Executor,
}

impl ImageRepository {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    /// Registry factory producing a repository bound to `executor`.
    pub fn factory(executor: Executor) -> RepositoryHandle {
        Arc::new(Self::new(executor))
    }

    pub async fn create(&self, image: &NewImage) -> StoreResult<Image> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(StoreError::TransactionClosed)?;

        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO images (id, title, url) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(&image.title)
            .bind(&image.url)
            .execute(&mut **tx)
            .await?;

        Ok(Image {
            id,
            title: image.title.clone(),
            url: image.url.clone(),
        })
    }

    pub async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Image>> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(StoreError::TransactionClosed)?;

        let row = sqlx::query("SELECT id, title, url FROM images WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(row.map(|r| Image {
            id: r.get("id"),
            title: r.get("title"),
            url: r.get("url"),
        }))
    }

    /// Delete an image row, returning the rows removed.
    ///
    /// Fails with a foreign key violation while a product still references
    /// the image; wrap in [`safe_delete`](crate::savepoint::safe_delete) to
    /// tolerate that.
    pub async fn delete(&self, id: Uuid) -> StoreResult<u64> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(StoreError::TransactionClosed)?;

        let result = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count(&self) -> StoreResult<i64> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(StoreError::TransactionClosed)?;

        let row = sqlx::query("SELECT COUNT(*) AS count FROM images")
            .fetch_one(&mut **tx)
            .await?;
        Ok(row.get("count"))
    }
}
