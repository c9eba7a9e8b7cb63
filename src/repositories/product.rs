use sqlx::Row;
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{NewProduct, Product};
use crate::error::{StoreError, StoreResult};
use crate::executor::Executor;
use crate::registry::RepositoryHandle;

/// Product Repository
pub struct ProductRepository {
    executor: Executor,
}

impl ProductRepository {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    /// Registry factory producing a repository bound to `executor`.
    pub fn factory(executor: Executor) -> RepositoryHandle {
        Arc::new(Self::new(executor))
    }

    /// Insert a product. The referenced supplier must exist; the foreign key
    /// rejects the insert otherwise.
    pub async fn create(&self, product: &NewProduct) -> StoreResult<Product> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(StoreError::TransactionClosed)?;

        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO products (id, name, category, price, supplier_id, image_id) \
             VALUES ($1, $2, $3, $4, $5, NULL)",
        )
        .bind(id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price)
        .bind(product.supplier_id)
        .execute(&mut **tx)
        .await?;

        Ok(Product {
            id,
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price,
            supplier_id: product.supplier_id,
            image_id: None,
        })
    }

    pub async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Product>> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(StoreError::TransactionClosed)?;

        let row = sqlx::query(
            "SELECT id, name, category, price, supplier_id, image_id \
             FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(row.map(|r| Product {
            id: r.get("id"),
            name: r.get("name"),
            category: r.get("category"),
            price: r.get("price"),
            supplier_id: r.get("supplier_id"),
            image_id: r.get("image_id"),
        }))
    }

    /// Point a product at a new image row, returning the rows updated.
    pub async fn relink_image(&self, id: Uuid, image_id: Uuid) -> StoreResult<u64> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(StoreError::TransactionClosed)?;

        let result = sqlx::query("UPDATE products SET image_id = $2 WHERE id = $1")
            .bind(id)
            .bind(image_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: Uuid) -> StoreResult<u64> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(StoreError::TransactionClosed)?;

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count(&self) -> StoreResult<i64> {
        let mut tx_guard = self.executor.tx.lock().await;
        let tx = tx_guard.as_mut().ok_or(StoreError::TransactionClosed)?;

        let row = sqlx::query("SELECT COUNT(*) AS count FROM products")
            .fetch_one(&mut **tx)
            .await?;
        Ok(row.get("count"))
    }
}
