//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain entities parse the
//! stored catalogue names and fail with [`UnknownVariant`] on drift.

use std::collections::BTreeSet;

use diesel::prelude::*;

use crate::domain::rental::{
    Address, AddressDraft, AddressId, Bike, BikeDraft, BikeId, Client, ClientDraft, ClientId,
    Comment, CommentId, Order, OrderId, Storage, StorageId, UnknownVariant,
};

use super::schema::{addresses, bike_orders, bikes, clients, comments, orders, storages};

// ---------------------------------------------------------------------------
// Addresses and storages
// ---------------------------------------------------------------------------

/// Row struct for reading from the addresses table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = addresses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AddressRow {
    pub id: i64,
    pub city: String,
    pub street: String,
    pub house: i32,
}

impl TryFrom<AddressRow> for Address {
    type Error = UnknownVariant;

    fn try_from(row: AddressRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AddressId::new(row.id),
            city: row.city.parse()?,
            street: row.street,
            house: row.house,
        })
    }
}

impl TryFrom<AddressRow> for Storage {
    type Error = UnknownVariant;

    fn try_from(row: AddressRow) -> Result<Self, Self::Error> {
        let address = Address::try_from(row)?;
        Ok(Self {
            id: address.storage_id(),
            address,
        })
    }
}

/// Insertable and changeset struct for address fields.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = addresses)]
pub(crate) struct AddressValues<'a> {
    pub city: &'a str,
    pub street: &'a str,
    pub house: i32,
}

impl<'a> From<&'a AddressDraft> for AddressValues<'a> {
    fn from(draft: &'a AddressDraft) -> Self {
        Self {
            city: draft.city.as_str(),
            street: &draft.street,
            house: draft.house,
        }
    }
}

/// Insertable struct for pairing a storage with its address.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = storages)]
pub(crate) struct NewStorageRow {
    pub id: i64,
}

// ---------------------------------------------------------------------------
// Bikes
// ---------------------------------------------------------------------------

/// Row struct for reading from the bikes table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bikes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BikeRow {
    pub id: i64,
    pub color: String,
    pub size: String,
    pub label: String,
    pub available: bool,
    pub storage_id: i64,
}

impl TryFrom<BikeRow> for Bike {
    type Error = UnknownVariant;

    fn try_from(row: BikeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: BikeId::new(row.id),
            color: row.color.parse()?,
            size: row.size.parse()?,
            label: row.label.parse()?,
            available: row.available,
            storage_id: StorageId::new(row.storage_id),
        })
    }
}

/// Insertable struct for creating bikes.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bikes)]
pub(crate) struct NewBikeRow<'a> {
    pub color: &'a str,
    pub size: &'a str,
    pub label: &'a str,
    pub available: bool,
    pub storage_id: i64,
}

impl From<&BikeDraft> for NewBikeRow<'static> {
    fn from(draft: &BikeDraft) -> Self {
        Self {
            color: draft.color.as_str(),
            size: draft.size.as_str(),
            label: draft.label.as_str(),
            available: true,
            storage_id: draft.storage_id.get(),
        }
    }
}

/// Changeset struct for updating bikes. Availability is not editable.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = bikes)]
pub(crate) struct BikeUpdate<'a> {
    pub color: &'a str,
    pub size: &'a str,
    pub label: &'a str,
    pub storage_id: i64,
}

impl From<&BikeDraft> for BikeUpdate<'static> {
    fn from(draft: &BikeDraft) -> Self {
        Self {
            color: draft.color.as_str(),
            size: draft.size.as_str(),
            label: draft.label.as_str(),
            storage_id: draft.storage_id.get(),
        }
    }
}

// ---------------------------------------------------------------------------
// Clients and comments
// ---------------------------------------------------------------------------

/// Row struct for reading from the clients table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = clients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ClientRow {
    pub id: i64,
    pub email: String,
    pub name: String,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Self {
            id: ClientId::new(row.id),
            email: row.email,
            name: row.name,
        }
    }
}

/// Insertable and changeset struct for client fields.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = clients)]
pub(crate) struct ClientValues<'a> {
    pub email: &'a str,
    pub name: &'a str,
}

impl<'a> From<&'a ClientDraft> for ClientValues<'a> {
    fn from(draft: &'a ClientDraft) -> Self {
        Self {
            email: &draft.email,
            name: &draft.name,
        }
    }
}

/// Row struct for reading from the comments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommentRow {
    pub id: i64,
    pub client_id: i64,
    pub description: String,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: CommentId::new(row.id),
            client_id: ClientId::new(row.client_id),
            description: row.description,
        }
    }
}

/// Insertable struct for creating comments.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub(crate) struct NewCommentRow<'a> {
    pub client_id: i64,
    pub description: &'a str,
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// Row struct for reading from the orders table.
#[derive(Debug, Clone, Copy, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderRow {
    pub id: i64,
    pub client_id: i64,
    pub storage_id: i64,
}

impl OrderRow {
    /// Combine the order row with its bike ids.
    pub fn into_order(self, bike_ids: impl IntoIterator<Item = i64>) -> Order {
        Order {
            id: OrderId::new(self.id),
            client_id: ClientId::new(self.client_id),
            storage_id: StorageId::new(self.storage_id),
            bike_ids: bike_ids.into_iter().map(BikeId::new).collect::<BTreeSet<_>>(),
        }
    }
}

/// Insertable and changeset struct for order references.
#[derive(Debug, Clone, Copy, Insertable, AsChangeset)]
#[diesel(table_name = orders)]
pub(crate) struct OrderValues {
    pub client_id: i64,
    pub storage_id: i64,
}

/// Row struct for the bike ↔ order join table.
#[derive(Debug, Clone, Copy, Queryable, Selectable, Insertable)]
#[diesel(table_name = bike_orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BikeOrderRow {
    pub bike_id: i64,
    pub order_id: i64,
}
