//! Driving port for rental writes.
//!
//! Inbound adapters validate payloads into drafts and hand them to
//! [`RentalCommand`]. Implementations enforce uniqueness and reference
//! rules and keep every association consistent.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::rental::{
    Address, AddressDraft, AddressId, Bike, BikeDraft, BikeId, Client, ClientDraft, ClientId,
    Comment, CommentDraft, Order, OrderDraft, OrderId, Storage,
};

/// Write operations over the rental graph.
///
/// # Errors
///
/// Every method reports:
/// - `not_found` when an id it depends on does not exist.
/// - `invalid_request` when a uniqueness rule rejects the write.
/// - `service_unavailable` when storage cannot be reached.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RentalCommand: Send + Sync {
    /// Register an address; its storage is created alongside.
    async fn create_address(&self, draft: AddressDraft) -> Result<Storage, Error>;

    /// Change an existing address.
    async fn update_address(&self, id: AddressId, draft: AddressDraft) -> Result<Address, Error>;

    /// Create the storage for an address that has none.
    async fn create_storage(&self, address_id: AddressId) -> Result<Storage, Error>;

    /// Register a bike in an existing storage.
    async fn create_bike(&self, draft: BikeDraft) -> Result<Bike, Error>;

    /// Change a bike, moving it between storages when needed.
    async fn update_bike(&self, id: BikeId, draft: BikeDraft) -> Result<Bike, Error>;

    /// Register a client.
    async fn create_client(&self, draft: ClientDraft) -> Result<Client, Error>;

    /// Change a client.
    async fn update_client(&self, id: ClientId, draft: ClientDraft) -> Result<Client, Error>;

    /// Attach a comment to a client.
    async fn create_comment(&self, draft: CommentDraft) -> Result<Comment, Error>;

    /// Record an order.
    async fn create_order(&self, draft: OrderDraft) -> Result<Order, Error>;

    /// Reassign an order's client, storage and bikes.
    async fn update_order(&self, id: OrderId, draft: OrderDraft) -> Result<Order, Error>;
}
