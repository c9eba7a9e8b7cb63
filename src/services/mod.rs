//! Per-entity services orchestrating multi-repository writes.
//!
//! Every operation is one [`UnitOfWork::run`](crate::UnitOfWork::run) call:
//! repositories are resolved from the transaction context, writes run in
//! program order on one transaction, and orphaned shared rows are garbage
//! collected with the savepoint-based safe delete.

pub mod client;
pub mod image;
pub mod product;
pub mod supplier;

pub use client::ClientService;
pub use image::ImageService;
pub use product::ProductService;
pub use supplier::SupplierService;

use uuid::Uuid;

use crate::entities::NewAddress;
use crate::error::{StoreError, StoreResult};
use crate::repositories::{AddressLinked, AddressRepository};
use crate::savepoint::safe_delete;
use crate::transaction::TransactionContext;

/// Move an address-linked entity onto a (possibly pre-existing) address row
/// and garbage-collect the row it pointed at before.
///
/// The new address is inserted-or-reused by natural key, the entity is
/// repointed, and the old row is deleted under a savepoint so that a
/// foreign key reference from another entity leaves it in place. The
/// entity vanishing mid-flight is a hard failure, not idempotent success.
pub(crate) async fn swap_address<R>(
    ctx: &TransactionContext,
    addresses: &AddressRepository,
    linked: &R,
    id: Uuid,
    new_address: &NewAddress,
) -> StoreResult<Uuid>
where
    R: AddressLinked + ?Sized,
{
    let address = addresses.insert_or_get(new_address).await?;

    let old_address_id = linked
        .address_of(id)
        .await?
        .ok_or_else(|| StoreError::not_found(linked.entity(), id))?;

    // Same natural key as before: nothing to repoint, nothing to collect.
    if old_address_id == address.id {
        return Ok(address.id);
    }

    let updated = linked.relink_address(id, address.id).await?;
    if updated == 0 {
        return Err(StoreError::not_found(linked.entity(), id));
    }

    safe_delete(ctx.executor(), "drop_orphan_address", "address", || async {
        addresses.delete(old_address_id).await.map(|_| ())
    })
    .await?;

    Ok(address.id)
}
