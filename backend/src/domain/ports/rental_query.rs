//! Driving port for rental reads.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::rental::{
    Address, AddressId, Bike, BikeId, Client, ClientId, Color, Comment, CommentId, Order, OrderId,
    Storage, StorageId,
};

/// Read operations over the rental graph.
///
/// Single-entity lookups and association listings fail with `not_found`
/// when the owning id does not exist. Collection reads never fail for lack
/// of data; they return an empty list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RentalQuery: Send + Sync {
    /// Every address.
    async fn addresses(&self) -> Result<Vec<Address>, Error>;
    /// One address.
    async fn address(&self, id: AddressId) -> Result<Address, Error>;

    /// Every storage.
    async fn storages(&self) -> Result<Vec<Storage>, Error>;
    /// One storage.
    async fn storage(&self, id: StorageId) -> Result<Storage, Error>;
    /// Bikes held by a storage, optionally restricted to one colour.
    async fn storage_bikes(&self, id: StorageId, color: Option<Color>) -> Result<Vec<Bike>, Error>;
    /// Orders placed at a storage.
    async fn storage_orders(&self, id: StorageId) -> Result<Vec<Order>, Error>;

    /// Every bike.
    async fn bikes(&self) -> Result<Vec<Bike>, Error>;
    /// One bike.
    async fn bike(&self, id: BikeId) -> Result<Bike, Error>;
    /// Orders that include a bike.
    async fn bike_orders(&self, id: BikeId) -> Result<Vec<Order>, Error>;

    /// Every client.
    async fn clients(&self) -> Result<Vec<Client>, Error>;
    /// One client.
    async fn client(&self, id: ClientId) -> Result<Client, Error>;
    /// Clients whose name contains `fragment` (case-sensitive).
    async fn search_clients(&self, fragment: &str) -> Result<Vec<Client>, Error>;
    /// Comments about a client.
    async fn client_comments(&self, id: ClientId) -> Result<Vec<Comment>, Error>;
    /// Orders placed by a client.
    async fn client_orders(&self, id: ClientId) -> Result<Vec<Order>, Error>;

    /// Every comment.
    async fn comments(&self) -> Result<Vec<Comment>, Error>;
    /// One comment.
    async fn comment(&self, id: CommentId) -> Result<Comment, Error>;

    /// Every order.
    async fn orders(&self) -> Result<Vec<Order>, Error>;
    /// One order.
    async fn order(&self, id: OrderId) -> Result<Order, Error>;
}
