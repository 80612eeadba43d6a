//! Failure taxonomy of the rental core.
//!
//! Every operation either succeeds completely or returns one of these errors
//! without having changed anything.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::Error;

/// The six entity types managed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// [`super::Address`]
    Address,
    /// [`super::Storage`]
    Storage,
    /// [`super::Bike`]
    Bike,
    /// [`super::Client`]
    Client,
    /// [`super::Comment`]
    Comment,
    /// [`super::Order`]
    Order,
}

impl EntityKind {
    /// Lower-case name used in messages and error details.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::Storage => "storage",
            Self::Bike => "bike",
            Self::Client => "client",
            Self::Comment => "comment",
            Self::Order => "order",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single rejected attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Offending attribute, e.g. `email`.
    pub field: &'static str,
    /// Human-readable explanation.
    pub message: String,
}

impl FieldViolation {
    /// Build a violation for `field`.
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}; ", self.field, self.message)
    }
}

/// Violations collected from one payload, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldViolations(Vec<FieldViolation>);

impl FieldViolations {
    /// Record a violation.
    pub fn push(&mut self, violation: FieldViolation) {
        self.0.push(violation);
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Recorded violations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldViolation> {
        self.0.iter()
    }

    /// `Ok(value)` when nothing was recorded, otherwise `Err(self)`.
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}

impl From<FieldViolation> for FieldViolations {
    fn from(value: FieldViolation) -> Self {
        Self(vec![value])
    }
}

impl std::fmt::Display for FieldViolations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0
            .iter()
            .try_for_each(|violation| std::fmt::Display::fmt(violation, f))
    }
}

/// Errors raised by the relationship engine and the validators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RentalError {
    /// An id-based lookup required by the operation failed.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of the missing entity.
        entity: EntityKind,
        /// Raw identifier that was looked up.
        id: i64,
    },
    /// A create request was rejected.
    #[error("{entity} not created: {reason}")]
    NotCreated {
        /// Kind of the entity being created.
        entity: EntityKind,
        /// Concatenated field messages or a collision message.
        reason: String,
    },
    /// An update request was rejected.
    #[error("{entity} not updated: {reason}")]
    NotUpdated {
        /// Kind of the entity being updated.
        entity: EntityKind,
        /// Concatenated field messages or a collision message.
        reason: String,
    },
}

impl RentalError {
    /// Missing entity of `entity` kind with the given raw id.
    pub fn not_found(entity: EntityKind, id: impl Into<i64>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Create rejection carrying `reason`.
    pub fn not_created(entity: EntityKind, reason: impl std::fmt::Display) -> Self {
        Self::NotCreated {
            entity,
            reason: reason.to_string(),
        }
    }

    /// Update rejection carrying `reason`.
    pub fn not_updated(entity: EntityKind, reason: impl std::fmt::Display) -> Self {
        Self::NotUpdated {
            entity,
            reason: reason.to_string(),
        }
    }

    /// Entity kind the error refers to.
    #[must_use]
    pub fn entity(&self) -> EntityKind {
        match self {
            Self::NotFound { entity, .. }
            | Self::NotCreated { entity, .. }
            | Self::NotUpdated { entity, .. } => *entity,
        }
    }
}

/// Whether a write creates a record or updates an existing one.
///
/// Used to pick between [`RentalError::NotCreated`] and
/// [`RentalError::NotUpdated`] for shared validation paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteIntent {
    /// New record.
    Create,
    /// Existing record.
    Update,
}

impl WriteIntent {
    /// Wrap `reason` in the rejection matching this intent.
    pub fn reject(self, entity: EntityKind, reason: impl std::fmt::Display) -> RentalError {
        match self {
            Self::Create => RentalError::not_created(entity, reason),
            Self::Update => RentalError::not_updated(entity, reason),
        }
    }
}

impl From<RentalError> for Error {
    fn from(value: RentalError) -> Self {
        let message = value.to_string();
        match value {
            RentalError::NotFound { entity, id } => Error::not_found(message).with_details(json!({
                "entity": entity,
                "id": id,
                "code": "not_found",
            })),
            RentalError::NotCreated { entity, reason } => Error::invalid_request(message)
                .with_details(json!({
                    "entity": entity,
                    "code": "not_created",
                    "reason": reason,
                })),
            RentalError::NotUpdated { entity, reason } => Error::invalid_request(message)
                .with_details(json!({
                    "entity": entity,
                    "code": "not_updated",
                    "reason": reason,
                })),
        }
    }
}
