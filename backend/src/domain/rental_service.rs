//! Rental domain service.
//!
//! Implements [`RentalCommand`] and [`RentalQuery`] on top of a
//! [`RentalRepository`]. Natural-key collisions are checked here first so the
//! caller gets a field-level message; the repository re-checks inside its
//! atomic write.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::{Error, ErrorCode};
use crate::domain::ports::{RentalCommand, RentalQuery, RentalRepository, RentalRepositoryError};
use crate::domain::rental::{
    Address, AddressDraft, AddressId, Bike, BikeDraft, BikeId, Client, ClientDraft, ClientId,
    Color, Comment, CommentDraft, CommentId, EntityKind, Order, OrderDraft, OrderId, RentalError,
    Storage, StorageId, WriteIntent, ensure_address_free, ensure_email_free,
};

/// Rental service implementing the driving ports.
#[derive(Clone)]
pub struct RentalService<R> {
    repo: Arc<R>,
}

impl<R> RentalService<R> {
    /// Create a new service over the given repository.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

fn map_repository_error(error: RentalRepositoryError) -> Error {
    match error {
        RentalRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("rental repository unavailable: {message}"))
        }
        RentalRepositoryError::Query { message } => {
            Error::internal(format!("rental repository error: {message}"))
        }
        RentalRepositoryError::Rejected { error } => Error::from(error),
    }
}

fn found<T>(entity: EntityKind, id: impl Into<i64>, value: Option<T>) -> Result<T, Error> {
    value.ok_or_else(|| Error::from(RentalError::not_found(entity, id)))
}

fn log_rejection(operation: &'static str, error: &Error) {
    match error.code() {
        ErrorCode::InvalidRequest | ErrorCode::NotFound => debug!(
            operation,
            code = ?error.code(),
            message = error.message(),
            "rental write rejected"
        ),
        _ => warn!(
            operation,
            code = ?error.code(),
            message = error.message(),
            "rental write failed"
        ),
    }
}

impl<R> RentalService<R>
where
    R: RentalRepository,
{
    async fn check_address_key(
        &self,
        draft: &AddressDraft,
        updating: Option<AddressId>,
        intent: WriteIntent,
    ) -> Result<(), Error> {
        let holder = self
            .repo
            .address_by_key(&draft.key())
            .await
            .map_err(map_repository_error)?;
        ensure_address_free(holder.as_ref(), updating)
            .map_err(|violation| Error::from(intent.reject(EntityKind::Address, violation)))
    }

    async fn check_email(
        &self,
        draft: &ClientDraft,
        updating: Option<ClientId>,
        intent: WriteIntent,
    ) -> Result<(), Error> {
        let holder = self
            .repo
            .client_by_email(&draft.email)
            .await
            .map_err(map_repository_error)?;
        ensure_email_free(holder.as_ref(), updating)
            .map_err(|violation| Error::from(intent.reject(EntityKind::Client, violation)))
    }

    async fn require_address(&self, id: AddressId) -> Result<Address, Error> {
        let address = self.repo.address(id).await.map_err(map_repository_error)?;
        found(EntityKind::Address, id, address)
    }

    async fn require_client(&self, id: ClientId) -> Result<Client, Error> {
        let client = self.repo.client(id).await.map_err(map_repository_error)?;
        found(EntityKind::Client, id, client)
    }

    async fn create_address_inner(&self, draft: AddressDraft) -> Result<Storage, Error> {
        self.check_address_key(&draft, None, WriteIntent::Create)
            .await?;
        self.repo
            .create_address(draft)
            .await
            .map_err(map_repository_error)
    }

    async fn update_address_inner(
        &self,
        id: AddressId,
        draft: AddressDraft,
    ) -> Result<Address, Error> {
        self.require_address(id).await?;
        self.check_address_key(&draft, Some(id), WriteIntent::Update)
            .await?;
        self.repo
            .update_address(id, draft)
            .await
            .map_err(map_repository_error)
    }

    async fn create_client_inner(&self, draft: ClientDraft) -> Result<Client, Error> {
        self.check_email(&draft, None, WriteIntent::Create).await?;
        self.repo
            .create_client(draft)
            .await
            .map_err(map_repository_error)
    }

    async fn update_client_inner(&self, id: ClientId, draft: ClientDraft) -> Result<Client, Error> {
        self.require_client(id).await?;
        self.check_email(&draft, Some(id), WriteIntent::Update)
            .await?;
        self.repo
            .update_client(id, draft)
            .await
            .map_err(map_repository_error)
    }
}

macro_rules! logged {
    ($operation:literal, $result:expr, |$ok:ident| $on_ok:expr) => {{
        let result = $result;
        match &result {
            Ok($ok) => $on_ok,
            Err(error) => log_rejection($operation, error),
        }
        result
    }};
}

#[async_trait]
impl<R> RentalCommand for RentalService<R>
where
    R: RentalRepository,
{
    async fn create_address(&self, draft: AddressDraft) -> Result<Storage, Error> {
        logged!("create_address", self.create_address_inner(draft).await, |storage| {
            info!(address_id = %storage.address.id, storage_id = %storage.id, "address created")
        })
    }

    async fn update_address(&self, id: AddressId, draft: AddressDraft) -> Result<Address, Error> {
        logged!("update_address", self.update_address_inner(id, draft).await, |address| {
            info!(address_id = %address.id, "address updated")
        })
    }

    async fn create_storage(&self, address_id: AddressId) -> Result<Storage, Error> {
        let result = self
            .repo
            .create_storage(address_id)
            .await
            .map_err(map_repository_error);
        logged!("create_storage", result, |storage| {
            info!(storage_id = %storage.id, "storage created")
        })
    }

    async fn create_bike(&self, draft: BikeDraft) -> Result<Bike, Error> {
        let result = self.repo.create_bike(draft).await.map_err(map_repository_error);
        logged!("create_bike", result, |bike| {
            info!(bike_id = %bike.id, storage_id = %bike.storage_id, "bike created")
        })
    }

    async fn update_bike(&self, id: BikeId, draft: BikeDraft) -> Result<Bike, Error> {
        let result = self
            .repo
            .reassign_bike(id, draft)
            .await
            .map_err(map_repository_error);
        logged!("update_bike", result, |bike| {
            info!(bike_id = %bike.id, storage_id = %bike.storage_id, "bike updated")
        })
    }

    async fn create_client(&self, draft: ClientDraft) -> Result<Client, Error> {
        logged!("create_client", self.create_client_inner(draft).await, |client| {
            info!(client_id = %client.id, "client created")
        })
    }

    async fn update_client(&self, id: ClientId, draft: ClientDraft) -> Result<Client, Error> {
        logged!("update_client", self.update_client_inner(id, draft).await, |client| {
            info!(client_id = %client.id, "client updated")
        })
    }

    async fn create_comment(&self, draft: CommentDraft) -> Result<Comment, Error> {
        let result = self
            .repo
            .create_comment(draft)
            .await
            .map_err(map_repository_error);
        logged!("create_comment", result, |comment| {
            info!(comment_id = %comment.id, client_id = %comment.client_id, "comment created")
        })
    }

    async fn create_order(&self, draft: OrderDraft) -> Result<Order, Error> {
        let result = self.repo.create_order(draft).await.map_err(map_repository_error);
        logged!("create_order", result, |order| {
            info!(
                order_id = %order.id,
                client_id = %order.client_id,
                storage_id = %order.storage_id,
                bikes = order.bike_ids.len(),
                "order created"
            )
        })
    }

    async fn update_order(&self, id: OrderId, draft: OrderDraft) -> Result<Order, Error> {
        let result = self
            .repo
            .reassign_order(id, draft)
            .await
            .map_err(map_repository_error);
        logged!("update_order", result, |order| {
            info!(
                order_id = %order.id,
                client_id = %order.client_id,
                storage_id = %order.storage_id,
                bikes = order.bike_ids.len(),
                "order reassigned"
            )
        })
    }
}

#[async_trait]
impl<R> RentalQuery for RentalService<R>
where
    R: RentalRepository,
{
    async fn addresses(&self) -> Result<Vec<Address>, Error> {
        self.repo.addresses().await.map_err(map_repository_error)
    }

    async fn address(&self, id: AddressId) -> Result<Address, Error> {
        self.require_address(id).await
    }

    async fn storages(&self) -> Result<Vec<Storage>, Error> {
        self.repo.storages().await.map_err(map_repository_error)
    }

    async fn storage(&self, id: StorageId) -> Result<Storage, Error> {
        let storage = self.repo.storage(id).await.map_err(map_repository_error)?;
        found(EntityKind::Storage, id, storage)
    }

    async fn storage_bikes(&self, id: StorageId, color: Option<Color>) -> Result<Vec<Bike>, Error> {
        let mut bikes = self
            .repo
            .storage_bikes(id)
            .await
            .map_err(map_repository_error)?;
        if let Some(color) = color {
            bikes.retain(|bike| bike.color == color);
            debug!(
                storage_id = %id,
                color = color.as_str(),
                matched = bikes.len(),
                "bikes filtered by colour"
            );
        }
        Ok(bikes)
    }

    async fn storage_orders(&self, id: StorageId) -> Result<Vec<Order>, Error> {
        self.repo
            .storage_orders(id)
            .await
            .map_err(map_repository_error)
    }

    async fn bikes(&self) -> Result<Vec<Bike>, Error> {
        self.repo.bikes().await.map_err(map_repository_error)
    }

    async fn bike(&self, id: BikeId) -> Result<Bike, Error> {
        let bike = self.repo.bike(id).await.map_err(map_repository_error)?;
        found(EntityKind::Bike, id, bike)
    }

    async fn bike_orders(&self, id: BikeId) -> Result<Vec<Order>, Error> {
        self.repo.bike_orders(id).await.map_err(map_repository_error)
    }

    async fn clients(&self) -> Result<Vec<Client>, Error> {
        self.repo.clients().await.map_err(map_repository_error)
    }

    async fn client(&self, id: ClientId) -> Result<Client, Error> {
        self.require_client(id).await
    }

    async fn search_clients(&self, fragment: &str) -> Result<Vec<Client>, Error> {
        self.repo
            .clients_named(fragment)
            .await
            .map_err(map_repository_error)
    }

    async fn client_comments(&self, id: ClientId) -> Result<Vec<Comment>, Error> {
        self.repo
            .client_comments(id)
            .await
            .map_err(map_repository_error)
    }

    async fn client_orders(&self, id: ClientId) -> Result<Vec<Order>, Error> {
        self.repo
            .client_orders(id)
            .await
            .map_err(map_repository_error)
    }

    async fn comments(&self) -> Result<Vec<Comment>, Error> {
        self.repo.comments().await.map_err(map_repository_error)
    }

    async fn comment(&self, id: CommentId) -> Result<Comment, Error> {
        let comment = self.repo.comment(id).await.map_err(map_repository_error)?;
        found(EntityKind::Comment, id, comment)
    }

    async fn orders(&self) -> Result<Vec<Order>, Error> {
        self.repo.orders().await.map_err(map_repository_error)
    }

    async fn order(&self, id: OrderId) -> Result<Order, Error> {
        let order = self.repo.order(id).await.map_err(map_repository_error)?;
        found(EntityKind::Order, id, order)
    }
}

#[cfg(test)]
#[path = "rental_service_tests.rs"]
mod tests;
