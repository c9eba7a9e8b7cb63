//! Transaction-bound repositories for the store schema.
//!
//! Each repository is materialized by its registry factory once per
//! transaction and shares the executor of the unit of work that resolved it.

pub mod address;
pub mod client;
pub mod image;
pub mod product;
pub mod supplier;

pub use address::AddressRepository;
pub use client::ClientRepository;
pub use image::ImageRepository;
pub use product::ProductRepository;
pub use supplier::SupplierRepository;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::registry::Registry;

/// Registry name for the address repository.
pub const ADDRESSES: &str = "address";
/// Registry name for the client repository.
pub const CLIENTS: &str = "client";
/// Registry name for the supplier repository.
pub const SUPPLIERS: &str = "supplier";
/// Registry name for the product repository.
pub const PRODUCTS: &str = "product";
/// Registry name for the image repository.
pub const IMAGES: &str = "image";

/// Capability shared by repositories whose entities link to an address row.
///
/// The address-swap orchestration is written once against this trait and
/// reused for clients and suppliers.
#[async_trait]
pub trait AddressLinked: Send + Sync {
    /// Entity label used in error messages.
    fn entity(&self) -> &'static str;

    /// The address id currently linked to `id`, if the entity exists.
    async fn address_of(&self, id: Uuid) -> StoreResult<Option<Uuid>>;

    /// Point `id` at `address_id`, returning the number of rows updated.
    async fn relink_address(&self, id: Uuid, address_id: Uuid) -> StoreResult<u64>;
}

/// Register the full set of store repositories under their default names.
pub fn register_store_repositories(registry: &Registry) -> StoreResult<()> {
    registry.register(ADDRESSES, AddressRepository::factory)?;
    registry.register(CLIENTS, ClientRepository::factory)?;
    registry.register(SUPPLIERS, SupplierRepository::factory)?;
    registry.register(PRODUCTS, ProductRepository::factory)?;
    registry.register(IMAGES, ImageRepository::factory)?;
    Ok(())
}
