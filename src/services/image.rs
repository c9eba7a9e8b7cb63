use std::sync::Arc;
use uuid::Uuid;

use crate::entities::Image;
use crate::error::{StoreError, StoreResult};
use crate::repositories::{ImageRepository, IMAGES};
use crate::savepoint::{safe_delete, DeleteOutcome};
use crate::unit_of_work::UnitOfWork;

/// Transactional operations over stored images.
pub struct ImageService {
    uow: Arc<UnitOfWork>,
}

impl ImageService {
    pub fn new(uow: Arc<UnitOfWork>) -> Self {
        Self { uow }
    }

    pub async fn get(&self, id: Uuid) -> StoreResult<Image> {
        self.uow
            .run(|ctx| async move {
                let images: Arc<ImageRepository> = ctx.resolve(IMAGES)?;
                images
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| StoreError::not_found("image", id))
            })
            .await
    }

    /// Delete an image unless a product still references it.
    ///
    /// Returns [`DeleteOutcome::SkippedStillReferenced`] instead of failing
    /// when the image is in use; a missing image is [`StoreError::NotFound`].
    pub async fn delete(&self, id: Uuid) -> StoreResult<DeleteOutcome> {
        self.uow
            .run(|ctx| async move {
                let images: Arc<ImageRepository> = ctx.resolve(IMAGES)?;

                images
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| StoreError::not_found("image", id))?;

                safe_delete(ctx.executor(), "drop_image", "image", || async {
                    images.delete(id).await.map(|_| ())
                })
                .await
            })
            .await
    }
}
