use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{NewImage, NewProduct, Product};
use crate::error::{StoreError, StoreResult};
use crate::repositories::{
    ImageRepository, ProductRepository, SupplierRepository, IMAGES, PRODUCTS, SUPPLIERS,
};
use crate::savepoint::safe_delete;
use crate::unit_of_work::UnitOfWork;

/// Transactional operations over products and their images.
pub struct ProductService {
    uow: Arc<UnitOfWork>,
}

impl ProductService {
    pub fn new(uow: Arc<UnitOfWork>) -> Self {
        Self { uow }
    }

    /// Insert a product after checking its supplier exists.
    ///
    /// A missing supplier is reported as [`StoreError::NotFound`] rather
    /// than surfacing the foreign key rejection.
    pub async fn create(&self, product: NewProduct) -> StoreResult<Product> {
        self.uow
            .run(|ctx| async move {
                let suppliers: Arc<SupplierRepository> = ctx.resolve(SUPPLIERS)?;
                let products: Arc<ProductRepository> = ctx.resolve(PRODUCTS)?;

                suppliers
                    .find_by_id(product.supplier_id)
                    .await?
                    .ok_or_else(|| StoreError::not_found("supplier", product.supplier_id))?;

                products.create(&product).await
            })
            .await
    }

    /// Attach a freshly stored image to the product, collecting the image
    /// it replaces.
    pub async fn set_image(&self, product_id: Uuid, image: NewImage) -> StoreResult<Product> {
        self.uow
            .run(|ctx| async move {
                let images: Arc<ImageRepository> = ctx.resolve(IMAGES)?;
                let products: Arc<ProductRepository> = ctx.resolve(PRODUCTS)?;

                let current = products
                    .find_by_id(product_id)
                    .await?
                    .ok_or_else(|| StoreError::not_found("product", product_id))?;

                let image = images.create(&image).await?;
                let updated = products.relink_image(product_id, image.id).await?;
                if updated == 0 {
                    return Err(StoreError::not_found("product", product_id));
                }

                if let Some(old_image_id) = current.image_id {
                    safe_delete(ctx.executor(), "drop_replaced_image", "image", || async {
                        images.delete(old_image_id).await.map(|_| ())
                    })
                    .await?;
                }

                Ok(Product {
                    image_id: Some(image.id),
                    ..current
                })
            })
            .await
    }

    pub async fn get(&self, id: Uuid) -> StoreResult<Product> {
        self.uow
            .run(|ctx| async move {
                let products: Arc<ProductRepository> = ctx.resolve(PRODUCTS)?;
                products
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| StoreError::not_found("product", id))
            })
            .await
    }

    /// Delete the product and collect its image if nothing else uses it.
    pub async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.uow
            .run(|ctx| async move {
                let images: Arc<ImageRepository> = ctx.resolve(IMAGES)?;
                let products: Arc<ProductRepository> = ctx.resolve(PRODUCTS)?;

                let product = products
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| StoreError::not_found("product", id))?;
                products.delete(id).await?;

                if let Some(image_id) = product.image_id {
                    safe_delete(ctx.executor(), "drop_orphan_image", "image", || async {
                        images.delete(image_id).await.map(|_| ())
                    })
                    .await?;
                }
                Ok(())
            })
            .await
    }
}
