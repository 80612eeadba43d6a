//! Request and response bodies for the rental endpoints.
//!
//! Requests keep every field optional so a missing field surfaces as a
//! field violation in the rejection reason rather than as a deserialiser
//! error. Responses flatten identifiers to plain integers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::rental::{
    Address, AddressDraft, Bike, BikeDraft, Client, ClientDraft, Comment, CommentDraft,
    EntityKind, FieldViolation, FieldViolations, Order, OrderDraft, Storage, WriteIntent,
};

/// Turn a draft parse failure into the rejection for `entity`.
pub(crate) fn draft<T>(
    intent: WriteIntent,
    entity: EntityKind,
    parsed: Result<T, FieldViolations>,
) -> Result<T, Error> {
    parsed.map_err(|violations| Error::from(intent.reject(entity, violations)))
}

/// Address create/update payload.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    #[schema(example = "MOSCOW")]
    pub city: Option<String>,
    #[schema(example = "Lenina")]
    pub street: Option<String>,
    #[schema(example = 18)]
    pub house: Option<i32>,
}

impl AddressRequest {
    pub(crate) fn parse(&self, intent: WriteIntent) -> Result<AddressDraft, Error> {
        draft(
            intent,
            EntityKind::Address,
            AddressDraft::parse(self.city.as_deref(), self.street.as_deref(), self.house),
        )
    }
}

/// Address as returned by the API. `storageId` always equals `id`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressBody {
    pub id: i64,
    #[schema(example = "MOSCOW")]
    pub city: String,
    pub street: String,
    pub house: i32,
    pub storage_id: i64,
}

impl From<Address> for AddressBody {
    fn from(address: Address) -> Self {
        Self {
            id: address.id.get(),
            city: address.city.as_str().to_owned(),
            storage_id: address.storage_id().get(),
            street: address.street,
            house: address.house,
        }
    }
}

/// Storage creation payload.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StorageRequest {
    pub address_id: Option<i64>,
}

impl StorageRequest {
    pub(crate) fn address_id(&self) -> Result<i64, Error> {
        draft(
            WriteIntent::Create,
            EntityKind::Storage,
            self.address_id.ok_or_else(|| {
                FieldViolations::from(FieldViolation::new("address", "address is required"))
            }),
        )
    }
}

/// Storage with its owned address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StorageBody {
    pub id: i64,
    pub address: AddressBody,
}

impl From<Storage> for StorageBody {
    fn from(storage: Storage) -> Self {
        Self {
            id: storage.id.get(),
            address: storage.address.into(),
        }
    }
}

/// Bike create/update payload.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BikeRequest {
    #[schema(example = "RED")]
    pub color: Option<String>,
    #[schema(example = "M")]
    pub size: Option<String>,
    #[schema(example = "FORWARD")]
    pub label: Option<String>,
    pub storage_id: Option<i64>,
}

impl BikeRequest {
    pub(crate) fn parse(&self, intent: WriteIntent) -> Result<BikeDraft, Error> {
        draft(
            intent,
            EntityKind::Bike,
            BikeDraft::parse(
                self.color.as_deref(),
                self.size.as_deref(),
                self.label.as_deref(),
                self.storage_id,
            ),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BikeBody {
    pub id: i64,
    pub color: String,
    pub size: String,
    pub label: String,
    pub available: bool,
    pub storage_id: i64,
}

impl From<Bike> for BikeBody {
    fn from(bike: Bike) -> Self {
        Self {
            id: bike.id.get(),
            color: bike.color.as_str().to_owned(),
            size: bike.size.as_str().to_owned(),
            label: bike.label.as_str().to_owned(),
            available: bike.available,
            storage_id: bike.storage_id.get(),
        }
    }
}

/// Client create/update payload.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientRequest {
    #[schema(example = "ivan@example.com")]
    pub email: Option<String>,
    #[schema(example = "Ivan")]
    pub name: Option<String>,
}

impl ClientRequest {
    pub(crate) fn parse(&self, intent: WriteIntent) -> Result<ClientDraft, Error> {
        draft(
            intent,
            EntityKind::Client,
            ClientDraft::parse(self.email.as_deref(), self.name.as_deref()),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientBody {
    pub id: i64,
    pub email: String,
    pub name: String,
}

impl From<Client> for ClientBody {
    fn from(client: Client) -> Self {
        Self {
            id: client.id.get(),
            email: client.email,
            name: client.name,
        }
    }
}

/// Comment creation payload.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub client_id: Option<i64>,
    #[schema(example = "Returned the bike late")]
    pub description: Option<String>,
}

impl CommentRequest {
    pub(crate) fn parse(&self) -> Result<CommentDraft, Error> {
        draft(
            WriteIntent::Create,
            EntityKind::Comment,
            CommentDraft::parse(self.client_id, self.description.as_deref()),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentBody {
    pub id: i64,
    pub client_id: i64,
    pub description: String,
}

impl From<Comment> for CommentBody {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id.get(),
            client_id: comment.client_id.get(),
            description: comment.description,
        }
    }
}

/// Order create/reassign payload.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub client_id: Option<i64>,
    pub storage_id: Option<i64>,
    pub bike_ids: Option<Vec<i64>>,
}

impl OrderRequest {
    pub(crate) fn parse(&self, intent: WriteIntent) -> Result<OrderDraft, Error> {
        draft(
            intent,
            EntityKind::Order,
            OrderDraft::parse(self.client_id, self.storage_id, self.bike_ids.as_deref()),
        )
    }
}

/// Order with its bikes in ascending id order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderBody {
    pub id: i64,
    pub client_id: i64,
    pub storage_id: i64,
    pub bike_ids: Vec<i64>,
}

impl From<Order> for OrderBody {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.get(),
            client_id: order.client_id.get(),
            storage_id: order.storage_id.get(),
            bike_ids: order.bike_ids.into_iter().map(i64::from).collect(),
        }
    }
}

/// Convert a list of domain values into response bodies.
pub(crate) fn bodies<T, B>(values: Vec<T>) -> Vec<B>
where
    B: From<T>,
{
    values.into_iter().map(B::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::rental::{BikeId, ClientId, OrderId, StorageId};
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn empty_client_request_lists_every_missing_field() {
        let error = ClientRequest::default()
            .parse(WriteIntent::Create)
            .expect_err("missing fields");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            error.details(),
            Some(&json!({
                "entity": "client",
                "code": "not_created",
                "reason": "email - email is required; name - name is required; ",
            }))
        );
    }

    #[rstest]
    fn storage_request_requires_address() {
        let error = StorageRequest::default()
            .address_id()
            .expect_err("missing address");
        assert_eq!(
            error.details().and_then(|d| d.get("reason")),
            Some(&json!("address - address is required; "))
        );
    }

    #[rstest]
    fn update_rejections_use_not_updated() {
        let request = BikeRequest {
            color: Some("PINK".to_owned()),
            ..BikeRequest::default()
        };
        let error = request.parse(WriteIntent::Update).expect_err("bad bike");
        assert_eq!(
            error.details().and_then(|d| d.get("code")),
            Some(&json!("not_updated"))
        );
    }

    #[rstest]
    fn order_body_serialises_camel_case() {
        let order = Order {
            id: OrderId::new(1),
            client_id: ClientId::new(2),
            storage_id: StorageId::new(3),
            bike_ids: [BikeId::new(5), BikeId::new(4)].into(),
        };
        let value = serde_json::to_value(OrderBody::from(order)).expect("serialises");
        assert_eq!(
            value,
            json!({"id": 1, "clientId": 2, "storageId": 3, "bikeIds": [4, 5]})
        );
    }
}
