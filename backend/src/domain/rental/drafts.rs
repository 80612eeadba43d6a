//! Validated inputs for create and update operations.
//!
//! Each `parse` constructor checks every field of a raw payload and reports
//! all violations at once, so a client can fix a request in one round trip.

use std::collections::BTreeSet;
use std::str::FromStr;

use super::catalog::UnknownVariant;
use super::{
    AddressKey, BikeId, City, ClientId, Color, FieldViolation, FieldViolations, Label, Size,
    StorageId,
};

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 30;

fn required<T>(
    violations: &mut FieldViolations,
    field: &'static str,
    value: Option<T>,
) -> Option<T> {
    if value.is_none() {
        violations.push(FieldViolation::new(field, format!("{field} is required")));
    }
    value
}

fn required_text(
    violations: &mut FieldViolations,
    field: &'static str,
    value: Option<&str>,
) -> Option<String> {
    match required(violations, field, value) {
        Some(text) if text.trim().is_empty() => {
            violations.push(FieldViolation::new(field, format!("{field} must not be blank")));
            None
        }
        other => other.map(str::to_owned),
    }
}

fn catalog_value<T>(
    violations: &mut FieldViolations,
    field: &'static str,
    value: Option<&str>,
) -> Option<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    let raw = required(violations, field, value)?;
    match raw.parse() {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            violations.push(FieldViolation::new(field, err.to_string()));
            None
        }
    }
}

/// Fields of an address create/update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressDraft {
    /// City the address is in.
    pub city: City,
    /// Street name.
    pub street: String,
    /// House number, strictly positive.
    pub house: i32,
}

impl AddressDraft {
    /// Validate raw address fields.
    ///
    /// # Examples
    /// ```
    /// use bikerent::domain::rental::{AddressDraft, City};
    ///
    /// let draft = AddressDraft::parse(Some("MOSCOW"), Some("Lenina"), Some(18)).expect("valid");
    /// assert_eq!(draft.city, City::Moscow);
    /// ```
    pub fn parse(
        city: Option<&str>,
        street: Option<&str>,
        house: Option<i32>,
    ) -> Result<Self, FieldViolations> {
        let mut violations = FieldViolations::default();
        let city = catalog_value(&mut violations, "city", city);
        let street = required_text(&mut violations, "street", street);
        let house = required(&mut violations, "house", house).filter(|house| {
            let positive = *house > 0;
            if !positive {
                violations.push(FieldViolation::new("house", "house must be positive"));
            }
            positive
        });

        match (city, street, house) {
            (Some(city), Some(street), Some(house)) => Ok(Self { city, street, house }),
            _ => Err(violations),
        }
    }

    /// Natural key the draft would occupy.
    #[must_use]
    pub fn key(&self) -> AddressKey {
        AddressKey {
            city: self.city,
            street: self.street.clone(),
            house: self.house,
        }
    }
}

/// Fields of a bike create/update request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BikeDraft {
    /// Frame colour.
    pub color: Color,
    /// Frame size.
    pub size: Size,
    /// Manufacturer.
    pub label: Label,
    /// Storage the bike should be held in.
    pub storage_id: StorageId,
}

impl BikeDraft {
    /// Validate raw bike fields.
    pub fn parse(
        color: Option<&str>,
        size: Option<&str>,
        label: Option<&str>,
        storage_id: Option<i64>,
    ) -> Result<Self, FieldViolations> {
        let mut violations = FieldViolations::default();
        let color = catalog_value(&mut violations, "color", color);
        let size = catalog_value(&mut violations, "size", size);
        let label = catalog_value(&mut violations, "label", label);
        let storage_id = required(&mut violations, "storage", storage_id);

        match (color, size, label, storage_id) {
            (Some(color), Some(size), Some(label), Some(storage_id)) => Ok(Self {
                color,
                size,
                label,
                storage_id: StorageId::new(storage_id),
            }),
            _ => Err(violations),
        }
    }
}

/// Fields of a client create/update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientDraft {
    /// Unique contact address.
    pub email: String,
    /// Display name.
    pub name: String,
}

fn is_well_formed_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

impl ClientDraft {
    /// Validate raw client fields.
    ///
    /// # Examples
    /// ```
    /// use bikerent::domain::rental::ClientDraft;
    ///
    /// let err = ClientDraft::parse(Some("not-an-email"), Some("A")).expect_err("invalid");
    /// assert_eq!(err.iter().count(), 2);
    /// ```
    pub fn parse(email: Option<&str>, name: Option<&str>) -> Result<Self, FieldViolations> {
        let mut violations = FieldViolations::default();

        let email = required(&mut violations, "email", email).and_then(|email| {
            if is_well_formed_email(email) {
                Some(email.to_owned())
            } else {
                violations.push(FieldViolation::new("email", "email must be well-formed"));
                None
            }
        });

        let name = required(&mut violations, "name", name).and_then(|name| {
            let length = name.chars().count();
            if (NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&length) {
                Some(name.to_owned())
            } else {
                let message = format!(
                    "name must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters"
                );
                violations.push(FieldViolation::new("name", message));
                None
            }
        });

        match (email, name) {
            (Some(email), Some(name)) => Ok(Self { email, name }),
            _ => Err(violations),
        }
    }
}

/// Fields of a comment create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDraft {
    /// Client the comment is about.
    pub client_id: ClientId,
    /// Comment text.
    pub description: String,
}

impl CommentDraft {
    /// Validate raw comment fields.
    pub fn parse(
        client_id: Option<i64>,
        description: Option<&str>,
    ) -> Result<Self, FieldViolations> {
        let mut violations = FieldViolations::default();
        let client_id = required(&mut violations, "client", client_id);
        let description = required_text(&mut violations, "description", description);

        match (client_id, description) {
            (Some(client_id), Some(description)) => Ok(Self {
                client_id: ClientId::new(client_id),
                description,
            }),
            _ => Err(violations),
        }
    }
}

/// Fields of an order create/reassign request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    /// Renting client.
    pub client_id: ClientId,
    /// Storage the bikes are rented from.
    pub storage_id: StorageId,
    /// Rented bikes; never empty.
    pub bike_ids: BTreeSet<BikeId>,
}

impl OrderDraft {
    /// Validate raw order fields. Duplicate bike ids collapse into one.
    pub fn parse(
        client_id: Option<i64>,
        storage_id: Option<i64>,
        bike_ids: Option<&[i64]>,
    ) -> Result<Self, FieldViolations> {
        let mut violations = FieldViolations::default();
        let client_id = required(&mut violations, "client", client_id);
        let storage_id = required(&mut violations, "storage", storage_id);
        let bike_ids = required(&mut violations, "bikes", bike_ids).and_then(|ids| {
            if ids.is_empty() {
                violations.push(FieldViolation::new("bikes", "at least one bike is required"));
                None
            } else {
                Some(ids.iter().copied().map(BikeId::new).collect::<BTreeSet<_>>())
            }
        });

        match (client_id, storage_id, bike_ids) {
            (Some(client_id), Some(storage_id), Some(bike_ids)) => Ok(Self {
                client_id: ClientId::new(client_id),
                storage_id: StorageId::new(storage_id),
                bike_ids,
            }),
            _ => Err(violations),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn address_reports_every_missing_field() {
        let err = AddressDraft::parse(None, None, None).expect_err("empty payload");
        assert_eq!(
            err.to_string(),
            "city - city is required; street - street is required; house - house is required; "
        );
    }

    #[rstest]
    #[case(Some("ATLANTIS"), Some("Lenina"), Some(1), "city - unknown city `ATLANTIS`; ")]
    #[case(Some("MOSCOW"), Some("  "), Some(1), "street - street must not be blank; ")]
    #[case(Some("MOSCOW"), Some("Lenina"), Some(0), "house - house must be positive; ")]
    fn address_rejects_bad_values(
        #[case] city: Option<&str>,
        #[case] street: Option<&str>,
        #[case] house: Option<i32>,
        #[case] expected: &str,
    ) {
        let err = AddressDraft::parse(city, street, house).expect_err("invalid address");
        assert_eq!(err.to_string(), expected);
    }

    #[rstest]
    fn bike_parses_catalog_names() {
        let draft =
            BikeDraft::parse(Some("RED"), Some("L"), Some("STELS"), Some(3)).expect("valid");
        assert_eq!(draft.color, Color::Red);
        assert_eq!(draft.size, Size::L);
        assert_eq!(draft.label, Label::Stels);
        assert_eq!(draft.storage_id, StorageId::new(3));
    }

    #[rstest]
    fn bike_requires_storage() {
        let err = BikeDraft::parse(Some("RED"), Some("L"), Some("STELS"), None)
            .expect_err("no storage");
        assert_eq!(err.to_string(), "storage - storage is required; ");
    }

    #[rstest]
    #[case("ivan@example.com", true)]
    #[case("ivan@example", false)]
    #[case("@example.com", false)]
    #[case("ivan @example.com", false)]
    #[case("ivan@@example.com", false)]
    #[case("ivan@.com", false)]
    fn email_shape(#[case] email: &str, #[case] ok: bool) {
        assert_eq!(ClientDraft::parse(Some(email), Some("Ivan")).is_ok(), ok);
    }

    #[rstest]
    #[case("I", false)]
    #[case("Iv", true)]
    #[case("Иван Петров", true)]
    #[case("abcdefghijklmnopqrstuvwxyz12345", false)]
    fn client_name_length_counts_characters(#[case] name: &str, #[case] ok: bool) {
        assert_eq!(ClientDraft::parse(Some("ivan@example.com"), Some(name)).is_ok(), ok);
    }

    #[rstest]
    fn order_requires_at_least_one_bike() {
        let err = OrderDraft::parse(Some(1), Some(1), Some(&[])).expect_err("no bikes");
        assert_eq!(err.to_string(), "bikes - at least one bike is required; ");
    }

    #[rstest]
    fn order_collapses_duplicate_bikes() {
        let draft = OrderDraft::parse(Some(1), Some(2), Some(&[5, 5, 4])).expect("valid");
        assert_eq!(
            draft.bike_ids.into_iter().collect::<Vec<_>>(),
            vec![BikeId::new(4), BikeId::new(5)]
        );
    }

    #[rstest]
    fn comment_rejects_blank_description() {
        let err = CommentDraft::parse(Some(1), Some("")).expect_err("blank");
        assert_eq!(err.to_string(), "description - description must not be blank; ");
    }
}
