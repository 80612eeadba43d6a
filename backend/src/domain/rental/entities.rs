//! Rental entities as seen by the rest of the system.
//!
//! Entities only carry their forward references. Back-collections (a
//! storage's bikes, a client's orders, ...) are owned by the store and
//! queried through it, which keeps the object graph acyclic.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{AddressId, BikeId, City, ClientId, Color, CommentId, Label, OrderId, Size, StorageId};

/// Natural key of an address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AddressKey {
    /// City the address is in.
    pub city: City,
    /// Street name.
    pub street: String,
    /// House number.
    pub house: i32,
}

/// A physical location; owns exactly one [`Storage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Assigned identifier.
    pub id: AddressId,
    /// City the address is in.
    pub city: City,
    /// Street name.
    pub street: String,
    /// House number.
    pub house: i32,
}

impl Address {
    /// Natural key used for duplicate detection.
    #[must_use]
    pub fn key(&self) -> AddressKey {
        AddressKey {
            city: self.city,
            street: self.street.clone(),
            house: self.house,
        }
    }

    /// Identifier of the storage paired with this address.
    #[must_use]
    pub fn storage_id(&self) -> StorageId {
        StorageId::from(self.id)
    }
}

/// A warehouse. Shares its identifier with its address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Storage {
    /// Identifier, equal to `address.id`.
    pub id: StorageId,
    /// The owned address.
    pub address: Address,
}

/// A rentable bike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bike {
    /// Assigned identifier.
    pub id: BikeId,
    /// Frame colour.
    pub color: Color,
    /// Frame size.
    pub size: Size,
    /// Manufacturer.
    pub label: Label,
    /// `true` until the bike is included in an order.
    pub available: bool,
    /// Storage holding the bike.
    pub storage_id: StorageId,
}

/// A rental customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Assigned identifier.
    pub id: ClientId,
    /// Unique contact address.
    pub email: String,
    /// Display name, 2 to 30 characters.
    pub name: String,
}

/// A free-text remark about a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Assigned identifier.
    pub id: CommentId,
    /// Client the comment belongs to.
    pub client_id: ClientId,
    /// Comment text.
    pub description: String,
}

/// A rental transaction: which client rented which bikes from which storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Assigned identifier.
    pub id: OrderId,
    /// Renting client.
    pub client_id: ClientId,
    /// Storage the bikes were rented from.
    pub storage_id: StorageId,
    /// Rented bikes.
    pub bike_ids: BTreeSet<BikeId>,
}
