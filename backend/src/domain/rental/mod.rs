//! Bicycle rental domain.
//!
//! Six entity types (addresses, storages, bikes, clients, comments and
//! orders) linked by bidirectional associations. [`RentalLedger`] keeps those
//! associations consistent in memory; the persistence adapter mirrors the
//! same rules inside database transactions.

mod catalog;
mod drafts;
mod entities;
mod error;
mod ids;
mod ledger;
mod relink;
mod uniqueness;

pub use self::catalog::{City, Color, Label, Size, UnknownVariant};
pub use self::drafts::{AddressDraft, BikeDraft, ClientDraft, CommentDraft, OrderDraft};
pub use self::entities::{Address, AddressKey, Bike, Client, Comment, Order, Storage};
pub use self::error::{EntityKind, FieldViolation, FieldViolations, RentalError, WriteIntent};
pub use self::ids::{AddressId, BikeId, ClientId, CommentId, OrderId, StorageId};
pub use self::ledger::RentalLedger;
pub use self::relink::Relink;
pub use self::uniqueness::{ensure_address_free, ensure_email_free, ensure_storage_free};
