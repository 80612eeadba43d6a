//! Port for rental persistence.
//!
//! [`RentalRepository`] exposes id lookups, natural-key lookups and one
//! command per write. Each command is atomic: it either applies every
//! forward and backward association change it implies, or fails without
//! changing anything. Reference checks (`NotFound`) and natural-key
//! collisions (`NotCreated`/`NotUpdated`) surface as
//! [`RentalRepositoryError::Rejected`].

use async_trait::async_trait;

use crate::domain::rental::{
    Address, AddressDraft, AddressId, AddressKey, Bike, BikeDraft, BikeId, Client, ClientDraft,
    ClientId, Comment, CommentDraft, CommentId, Order, OrderDraft, OrderId, RentalError,
    Storage, StorageId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by rental repository adapters.
    pub enum RentalRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "rental repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "rental repository query failed: {message}",
        /// The write or lookup was refused by the relationship rules.
        Rejected { error: RentalError } => "{error}",
    }
}

impl From<RentalError> for RentalRepositoryError {
    fn from(error: RentalError) -> Self {
        Self::Rejected { error }
    }
}

/// Port for rental entity storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RentalRepository: Send + Sync {
    /// Fetch an address by id.
    async fn address(&self, id: AddressId) -> Result<Option<Address>, RentalRepositoryError>;

    /// Fetch the address holding a (city, street, house) triple.
    async fn address_by_key(
        &self,
        key: &AddressKey,
    ) -> Result<Option<Address>, RentalRepositoryError>;

    /// Every address, ordered by id.
    async fn addresses(&self) -> Result<Vec<Address>, RentalRepositoryError>;

    /// Persist a new address and the storage paired with it.
    async fn create_address(&self, draft: AddressDraft) -> Result<Storage, RentalRepositoryError>;

    /// Replace the fields of an existing address.
    async fn update_address(
        &self,
        id: AddressId,
        draft: AddressDraft,
    ) -> Result<Address, RentalRepositoryError>;

    /// Fetch a storage by id.
    async fn storage(&self, id: StorageId) -> Result<Option<Storage>, RentalRepositoryError>;

    /// Every storage, ordered by id.
    async fn storages(&self) -> Result<Vec<Storage>, RentalRepositoryError>;

    /// Create the storage for an address that has none.
    async fn create_storage(&self, address_id: AddressId)
    -> Result<Storage, RentalRepositoryError>;

    /// Bikes held by a storage.
    async fn storage_bikes(&self, id: StorageId) -> Result<Vec<Bike>, RentalRepositoryError>;

    /// Orders placed at a storage.
    async fn storage_orders(&self, id: StorageId) -> Result<Vec<Order>, RentalRepositoryError>;

    /// Fetch a bike by id.
    async fn bike(&self, id: BikeId) -> Result<Option<Bike>, RentalRepositoryError>;

    /// Every bike, ordered by id.
    async fn bikes(&self) -> Result<Vec<Bike>, RentalRepositoryError>;

    /// Persist a new, available bike.
    async fn create_bike(&self, draft: BikeDraft) -> Result<Bike, RentalRepositoryError>;

    /// Update a bike and move it to the storage named by the draft.
    async fn reassign_bike(
        &self,
        id: BikeId,
        draft: BikeDraft,
    ) -> Result<Bike, RentalRepositoryError>;

    /// Orders that include a bike.
    async fn bike_orders(&self, id: BikeId) -> Result<Vec<Order>, RentalRepositoryError>;

    /// Fetch a client by id.
    async fn client(&self, id: ClientId) -> Result<Option<Client>, RentalRepositoryError>;

    /// Fetch the client owning an email.
    async fn client_by_email(&self, email: &str) -> Result<Option<Client>, RentalRepositoryError>;

    /// Every client, ordered by id.
    async fn clients(&self) -> Result<Vec<Client>, RentalRepositoryError>;

    /// Clients whose name contains `fragment`.
    async fn clients_named(&self, fragment: &str) -> Result<Vec<Client>, RentalRepositoryError>;

    /// Persist a new client.
    async fn create_client(&self, draft: ClientDraft) -> Result<Client, RentalRepositoryError>;

    /// Replace a client's email and name.
    async fn update_client(
        &self,
        id: ClientId,
        draft: ClientDraft,
    ) -> Result<Client, RentalRepositoryError>;

    /// Comments about a client.
    async fn client_comments(&self, id: ClientId) -> Result<Vec<Comment>, RentalRepositoryError>;

    /// Orders placed by a client.
    async fn client_orders(&self, id: ClientId) -> Result<Vec<Order>, RentalRepositoryError>;

    /// Fetch a comment by id.
    async fn comment(&self, id: CommentId) -> Result<Option<Comment>, RentalRepositoryError>;

    /// Every comment, ordered by id.
    async fn comments(&self) -> Result<Vec<Comment>, RentalRepositoryError>;

    /// Persist a comment for an existing client.
    async fn create_comment(&self, draft: CommentDraft) -> Result<Comment, RentalRepositoryError>;

    /// Fetch an order by id.
    async fn order(&self, id: OrderId) -> Result<Option<Order>, RentalRepositoryError>;

    /// Every order, ordered by id.
    async fn orders(&self) -> Result<Vec<Order>, RentalRepositoryError>;

    /// Persist an order and mark its bikes unavailable.
    async fn create_order(&self, draft: OrderDraft) -> Result<Order, RentalRepositoryError>;

    /// Point an order at a new client, storage and bike set.
    async fn reassign_order(
        &self,
        id: OrderId,
        draft: OrderDraft,
    ) -> Result<Order, RentalRepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rental::EntityKind;
    use rstest::rstest;

    #[rstest]
    fn rejected_error_displays_inner_message() {
        let error = RentalRepositoryError::from(RentalError::not_found(EntityKind::Bike, 3_i64));
        assert_eq!(error.to_string(), "bike 3 not found");
    }

    #[rstest]
    fn constructors_accept_str_messages() {
        let error = RentalRepositoryError::connection("pool exhausted");
        assert_eq!(
            error.to_string(),
            "rental repository connection failed: pool exhausted"
        );
    }
}
