//! Natural-key duplicate checks.
//!
//! Each check receives the record currently holding the key (if any) and,
//! for updates, the id of the record being changed. A record never collides
//! with itself, so re-submitting unchanged values is accepted.

use super::{Address, AddressId, Client, ClientId, FieldViolation, Storage};

fn collides<I: PartialEq>(holder: Option<I>, updating: Option<I>) -> bool {
    match (holder, updating) {
        (Some(holder), Some(updating)) => holder != updating,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

/// Reject an address whose (city, street, house) is already taken.
///
/// # Examples
/// ```
/// use bikerent::domain::rental::{Address, AddressId, City, ensure_address_free};
///
/// let held = Address {
///     id: AddressId::new(1),
///     city: City::Moscow,
///     street: "Lenina".into(),
///     house: 18,
/// };
/// assert!(ensure_address_free(Some(&held), None).is_err());
/// assert!(ensure_address_free(Some(&held), Some(AddressId::new(1))).is_ok());
/// ```
pub fn ensure_address_free(
    holder: Option<&Address>,
    updating: Option<AddressId>,
) -> Result<(), FieldViolation> {
    if collides(holder.map(|address| address.id), updating) {
        return Err(FieldViolation::new("house", "an address with these details already exists"));
    }
    Ok(())
}

/// Reject a client whose email is already used by another client.
pub fn ensure_email_free(
    holder: Option<&Client>,
    updating: Option<ClientId>,
) -> Result<(), FieldViolation> {
    if collides(holder.map(|client| client.id), updating) {
        return Err(FieldViolation::new("email", "a client with this email already exists"));
    }
    Ok(())
}

/// Reject a storage for an address that already has one.
pub fn ensure_storage_free(holder: Option<&Storage>) -> Result<(), FieldViolation> {
    if holder.is_some() {
        return Err(FieldViolation::new("address", "a storage already exists at this address"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rental::{City, StorageId};
    use rstest::{fixture, rstest};

    #[fixture]
    fn lenina() -> Address {
        Address {
            id: AddressId::new(1),
            city: City::Moscow,
            street: "Lenina".to_owned(),
            house: 18,
        }
    }

    #[fixture]
    fn ivan() -> Client {
        Client {
            id: ClientId::new(4),
            email: "ivan@example.com".to_owned(),
            name: "Ivan".to_owned(),
        }
    }

    #[rstest]
    fn free_key_is_accepted() {
        assert!(ensure_address_free(None, None).is_ok());
        assert!(ensure_email_free(None, Some(ClientId::new(1))).is_ok());
    }

    #[rstest]
    fn taken_address_is_rejected_on_house(lenina: Address) {
        let violation = ensure_address_free(Some(&lenina), None).expect_err("duplicate");
        assert_eq!(violation.field, "house");
    }

    #[rstest]
    fn address_update_does_not_collide_with_itself(lenina: Address) {
        assert!(ensure_address_free(Some(&lenina), Some(lenina.id)).is_ok());
        assert!(ensure_address_free(Some(&lenina), Some(AddressId::new(2))).is_err());
    }

    #[rstest]
    fn client_keeps_own_email(ivan: Client) {
        assert!(ensure_email_free(Some(&ivan), Some(ivan.id)).is_ok());
    }

    #[rstest]
    fn client_cannot_take_foreign_email(ivan: Client) {
        let violation =
            ensure_email_free(Some(&ivan), Some(ClientId::new(5))).expect_err("email taken");
        assert_eq!(violation.field, "email");
        assert!(ensure_email_free(Some(&ivan), None).is_err());
    }

    #[rstest]
    fn second_storage_for_address_is_rejected(lenina: Address) {
        let storage = Storage {
            id: StorageId::from(lenina.id),
            address: lenina,
        };
        let violation = ensure_storage_free(Some(&storage)).expect_err("storage exists");
        assert_eq!(violation.field, "address");
        assert!(ensure_storage_free(None).is_ok());
    }
}
