//! Server-assigned identifiers for rental entities.
//!
//! Identifiers are immutable once assigned. A storage shares its primary key
//! with its address, expressed by `From<AddressId> for StorageId`.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw identifier value.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Raw identifier value.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of an [`super::Address`].
    AddressId
);
define_id!(
    /// Identifier of a [`super::Storage`]; always equal to its address id.
    StorageId
);
define_id!(
    /// Identifier of a [`super::Bike`].
    BikeId
);
define_id!(
    /// Identifier of a [`super::Client`].
    ClientId
);
define_id!(
    /// Identifier of a [`super::Comment`].
    CommentId
);
define_id!(
    /// Identifier of an [`super::Order`].
    OrderId
);

impl From<AddressId> for StorageId {
    fn from(value: AddressId) -> Self {
        Self(value.get())
    }
}

impl From<StorageId> for AddressId {
    fn from(value: StorageId) -> Self {
        Self(value.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_id_mirrors_address_id() {
        let address = AddressId::new(42);
        assert_eq!(StorageId::from(address).get(), 42);
        assert_eq!(AddressId::from(StorageId::from(address)), address);
    }

    #[test]
    fn ids_serialise_as_bare_integers() {
        let value = serde_json::to_value(BikeId::new(7)).expect("serialise id");
        assert_eq!(value, serde_json::json!(7));
    }
}
