//! In-memory rental repository.
//!
//! Holds a [`RentalLedger`] behind an async mutex so each command runs against
//! a consistent snapshot and applies atomically.

use async_trait::async_trait;

use crate::domain::ports::{RentalRepository, RentalRepositoryError};
use crate::domain::rental::{
    Address, AddressDraft, AddressId, AddressKey, Bike, BikeDraft, BikeId, Client, ClientDraft,
    ClientId, Comment, CommentDraft, CommentId, Order, OrderDraft, OrderId, RentalLedger, Storage,
    StorageId,
};

/// Repository that holds everything in a [`RentalLedger`] behind an async
/// mutex. Used when no database is configured and throughout the tests.
#[derive(Debug, Default)]
pub struct InMemoryRentalRepository {
    ledger: tokio::sync::Mutex<RentalLedger>,
}

impl InMemoryRentalRepository {
    /// Empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn from_ledger(ledger: RentalLedger) -> Self {
        Self {
            ledger: tokio::sync::Mutex::new(ledger),
        }
    }
}

fn owned<'a, T: Clone + 'a>(items: impl IntoIterator<Item = &'a T>) -> Vec<T> {
    items.into_iter().cloned().collect()
}

#[async_trait]
impl RentalRepository for InMemoryRentalRepository {
    async fn address(&self, id: AddressId) -> Result<Option<Address>, RentalRepositoryError> {
        Ok(self.ledger.lock().await.address(id).cloned())
    }

    async fn address_by_key(
        &self,
        key: &AddressKey,
    ) -> Result<Option<Address>, RentalRepositoryError> {
        Ok(self.ledger.lock().await.address_by_key(key).cloned())
    }

    async fn addresses(&self) -> Result<Vec<Address>, RentalRepositoryError> {
        Ok(owned(self.ledger.lock().await.addresses()))
    }

    async fn create_address(&self, draft: AddressDraft) -> Result<Storage, RentalRepositoryError> {
        Ok(self.ledger.lock().await.create_address(draft)?)
    }

    async fn update_address(
        &self,
        id: AddressId,
        draft: AddressDraft,
    ) -> Result<Address, RentalRepositoryError> {
        Ok(self.ledger.lock().await.update_address(id, draft)?)
    }

    async fn storage(&self, id: StorageId) -> Result<Option<Storage>, RentalRepositoryError> {
        Ok(self.ledger.lock().await.storage(id))
    }

    async fn storages(&self) -> Result<Vec<Storage>, RentalRepositoryError> {
        Ok(self.ledger.lock().await.storages())
    }

    async fn create_storage(
        &self,
        address_id: AddressId,
    ) -> Result<Storage, RentalRepositoryError> {
        Ok(self.ledger.lock().await.create_storage(address_id)?)
    }

    async fn storage_bikes(&self, id: StorageId) -> Result<Vec<Bike>, RentalRepositoryError> {
        Ok(owned(self.ledger.lock().await.storage_bikes(id)?))
    }

    async fn storage_orders(&self, id: StorageId) -> Result<Vec<Order>, RentalRepositoryError> {
        Ok(owned(self.ledger.lock().await.storage_orders(id)?))
    }

    async fn bike(&self, id: BikeId) -> Result<Option<Bike>, RentalRepositoryError> {
        Ok(self.ledger.lock().await.bike(id).cloned())
    }

    async fn bikes(&self) -> Result<Vec<Bike>, RentalRepositoryError> {
        Ok(owned(self.ledger.lock().await.bikes()))
    }

    async fn create_bike(&self, draft: BikeDraft) -> Result<Bike, RentalRepositoryError> {
        Ok(self.ledger.lock().await.create_bike(draft)?)
    }

    async fn reassign_bike(
        &self,
        id: BikeId,
        draft: BikeDraft,
    ) -> Result<Bike, RentalRepositoryError> {
        Ok(self.ledger.lock().await.reassign_bike(id, draft)?)
    }

    async fn bike_orders(&self, id: BikeId) -> Result<Vec<Order>, RentalRepositoryError> {
        Ok(owned(self.ledger.lock().await.bike_orders(id)?))
    }

    async fn client(&self, id: ClientId) -> Result<Option<Client>, RentalRepositoryError> {
        Ok(self.ledger.lock().await.client(id).cloned())
    }

    async fn client_by_email(&self, email: &str) -> Result<Option<Client>, RentalRepositoryError> {
        Ok(self.ledger.lock().await.client_by_email(email).cloned())
    }

    async fn clients(&self) -> Result<Vec<Client>, RentalRepositoryError> {
        Ok(owned(self.ledger.lock().await.clients()))
    }

    async fn clients_named(&self, fragment: &str) -> Result<Vec<Client>, RentalRepositoryError> {
        Ok(owned(self.ledger.lock().await.clients_named(fragment)))
    }

    async fn create_client(&self, draft: ClientDraft) -> Result<Client, RentalRepositoryError> {
        Ok(self.ledger.lock().await.create_client(draft)?)
    }

    async fn update_client(
        &self,
        id: ClientId,
        draft: ClientDraft,
    ) -> Result<Client, RentalRepositoryError> {
        Ok(self.ledger.lock().await.update_client(id, draft)?)
    }

    async fn client_comments(&self, id: ClientId) -> Result<Vec<Comment>, RentalRepositoryError> {
        Ok(owned(self.ledger.lock().await.client_comments(id)?))
    }

    async fn client_orders(&self, id: ClientId) -> Result<Vec<Order>, RentalRepositoryError> {
        Ok(owned(self.ledger.lock().await.client_orders(id)?))
    }

    async fn comment(&self, id: CommentId) -> Result<Option<Comment>, RentalRepositoryError> {
        Ok(self.ledger.lock().await.comment(id).cloned())
    }

    async fn comments(&self) -> Result<Vec<Comment>, RentalRepositoryError> {
        Ok(owned(self.ledger.lock().await.comments()))
    }

    async fn create_comment(&self, draft: CommentDraft) -> Result<Comment, RentalRepositoryError> {
        Ok(self.ledger.lock().await.create_comment(draft)?)
    }

    async fn order(&self, id: OrderId) -> Result<Option<Order>, RentalRepositoryError> {
        Ok(self.ledger.lock().await.order(id).cloned())
    }

    async fn orders(&self) -> Result<Vec<Order>, RentalRepositoryError> {
        Ok(owned(self.ledger.lock().await.orders()))
    }

    async fn create_order(&self, draft: OrderDraft) -> Result<Order, RentalRepositoryError> {
        Ok(self.ledger.lock().await.create_order(draft)?)
    }

    async fn reassign_order(
        &self,
        id: OrderId,
        draft: OrderDraft,
    ) -> Result<Order, RentalRepositoryError> {
        Ok(self.ledger.lock().await.reassign_order(id, draft)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rental::{City, Color, EntityKind, Label, RentalError, Size};

    fn lenina() -> AddressDraft {
        AddressDraft {
            city: City::Moscow,
            street: "Lenina".to_owned(),
            house: 18,
        }
    }

    #[tokio::test]
    async fn missing_storage_is_rejected() {
        let repo = InMemoryRentalRepository::new();
        let err = repo
            .storage_bikes(StorageId::new(4))
            .await
            .expect_err("no storage yet");
        assert_eq!(
            err,
            RentalRepositoryError::rejected(RentalError::not_found(EntityKind::Storage, 4_i64))
        );
    }

    #[tokio::test]
    async fn created_address_is_found_by_key() {
        let repo = InMemoryRentalRepository::new();
        let storage = repo.create_address(lenina()).await.expect("created");

        let found = repo
            .address_by_key(&storage.address.key())
            .await
            .expect("lookup");
        assert_eq!(found, Some(storage.address));
    }

    #[tokio::test]
    async fn seeded_ledger_is_visible() {
        let mut ledger = RentalLedger::new();
        let storage = ledger.create_address(lenina()).expect("seeded");
        ledger
            .create_bike(BikeDraft {
                color: Color::Red,
                size: Size::S,
                label: Label::Fuji,
                storage_id: storage.id,
            })
            .expect("bike");

        let repo = InMemoryRentalRepository::from_ledger(ledger);
        let bikes = repo.storage_bikes(storage.id).await.expect("bikes");
        assert_eq!(bikes.len(), 1);
        assert!(bikes[0].available);
    }
}
