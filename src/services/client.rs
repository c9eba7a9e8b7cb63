use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{Client, NewAddress, NewClient};
use crate::error::{StoreError, StoreResult};
use crate::repositories::{AddressRepository, ClientRepository, ADDRESSES, CLIENTS};
use crate::savepoint::safe_delete;
use crate::services::swap_address;
use crate::unit_of_work::UnitOfWork;

/// Transactional operations over clients and their addresses.
pub struct ClientService {
    uow: Arc<UnitOfWork>,
}

impl ClientService {
    pub fn new(uow: Arc<UnitOfWork>) -> Self {
        Self { uow }
    }

    /// Create a client together with its address in one transaction.
    ///
    /// The address row is reused when the `(country, city, street)` key
    /// already exists.
    pub async fn create(&self, client: NewClient, address: NewAddress) -> StoreResult<Client> {
        self.uow
            .run(|ctx| async move {
                let addresses: Arc<AddressRepository> = ctx.resolve(ADDRESSES)?;
                let clients: Arc<ClientRepository> = ctx.resolve(CLIENTS)?;

                let address = addresses.insert_or_get(&address).await?;
                clients.create(&client, address.id).await
            })
            .await
    }

    /// Move the client onto a new address and collect the old row if no
    /// other entity still references it.
    pub async fn update_address(&self, id: Uuid, address: NewAddress) -> StoreResult<Client> {
        self.uow
            .run(|ctx| async move {
                let addresses: Arc<AddressRepository> = ctx.resolve(ADDRESSES)?;
                let clients: Arc<ClientRepository> = ctx.resolve(CLIENTS)?;

                let address_id =
                    swap_address(&ctx, addresses.as_ref(), clients.as_ref(), id, &address).await?;
                tracing::debug!(client_id = %id, address_id = %address_id, "client address updated");

                clients
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| StoreError::not_found("client", id))
            })
            .await
    }

    pub async fn get(&self, id: Uuid) -> StoreResult<Client> {
        self.uow
            .run(|ctx| async move {
                let clients: Arc<ClientRepository> = ctx.resolve(CLIENTS)?;
                clients
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| StoreError::not_found("client", id))
            })
            .await
    }

    /// Delete the client and collect its address if nothing else uses it.
    pub async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.uow
            .run(|ctx| async move {
                let addresses: Arc<AddressRepository> = ctx.resolve(ADDRESSES)?;
                let clients: Arc<ClientRepository> = ctx.resolve(CLIENTS)?;

                let client = clients
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| StoreError::not_found("client", id))?;
                clients.delete(id).await?;

                safe_delete(ctx.executor(), "drop_orphan_address", "address", || async {
                    addresses.delete(client.address_id).await.map(|_| ())
                })
                .await?;
                Ok(())
            })
            .await
    }
}
