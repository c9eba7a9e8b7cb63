use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{NewAddress, NewSupplier, Supplier};
use crate::error::{StoreError, StoreResult};
use crate::repositories::{AddressRepository, SupplierRepository, ADDRESSES, SUPPLIERS};
use crate::savepoint::safe_delete;
use crate::services::swap_address;
use crate::unit_of_work::UnitOfWork;

/// Transactional operations over suppliers and their addresses.
pub struct SupplierService {
    uow: Arc<UnitOfWork>,
}

impl SupplierService {
    pub fn new(uow: Arc<UnitOfWork>) -> Self {
        Self { uow }
    }

    /// Create a supplier together with its address in one transaction.
    ///
    /// The address row is reused when the `(country, city, street)` key
    /// already exists, so two suppliers at one address share one row.
    pub async fn create(&self, supplier: NewSupplier, address: NewAddress) -> StoreResult<Supplier> {
        self.uow
            .run(|ctx| async move {
                let addresses: Arc<AddressRepository> = ctx.resolve(ADDRESSES)?;
                let suppliers: Arc<SupplierRepository> = ctx.resolve(SUPPLIERS)?;

                let address = addresses.insert_or_get(&address).await?;
                suppliers.create(&supplier, address.id).await
            })
            .await
    }

    /// Move the supplier onto a new address and collect the old row if no
    /// other entity still references it.
    pub async fn update_address(&self, id: Uuid, address: NewAddress) -> StoreResult<Supplier> {
        self.uow
            .run(|ctx| async move {
                let addresses: Arc<AddressRepository> = ctx.resolve(ADDRESSES)?;
                let suppliers: Arc<SupplierRepository> = ctx.resolve(SUPPLIERS)?;

                let address_id =
                    swap_address(&ctx, addresses.as_ref(), suppliers.as_ref(), id, &address)
                        .await?;
                tracing::debug!(supplier_id = %id, address_id = %address_id, "supplier address updated");

                suppliers
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| StoreError::not_found("supplier", id))
            })
            .await
    }

    pub async fn get(&self, id: Uuid) -> StoreResult<Supplier> {
        self.uow
            .run(|ctx| async move {
                let suppliers: Arc<SupplierRepository> = ctx.resolve(SUPPLIERS)?;
                suppliers
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| StoreError::not_found("supplier", id))
            })
            .await
    }

    /// Delete the supplier and collect its address if nothing else uses it.
    pub async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.uow
            .run(|ctx| async move {
                let addresses: Arc<AddressRepository> = ctx.resolve(ADDRESSES)?;
                let suppliers: Arc<SupplierRepository> = ctx.resolve(SUPPLIERS)?;

                let supplier = suppliers
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| StoreError::not_found("supplier", id))?;
                suppliers.delete(id).await?;

                safe_delete(ctx.executor(), "drop_orphan_address", "address", || async {
                    addresses.delete(supplier.address_id).await.map(|_| ())
                })
                .await?;
                Ok(())
            })
            .await
    }
}
