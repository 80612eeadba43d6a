//! Storage endpoints.
//!
//! Storages are normally created alongside their address; `POST /storages`
//! only covers an address left without one.

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::domain::Error;
use crate::domain::rental::{AddressId, Color, StorageId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{BikeBody, OrderBody, StorageBody, StorageRequest, bodies};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Optional colour filter for a storage's bikes.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BikeFilter {
    /// Catalogue colour name such as `RED`.
    pub color: Option<String>,
}

impl BikeFilter {
    fn color(&self) -> Result<Option<Color>, Error> {
        self.color
            .as_deref()
            .map(|raw| {
                raw.parse::<Color>().map_err(|err| {
                    Error::invalid_request(err.to_string())
                        .with_details(json!({ "field": "color", "code": "unknown_color" }))
                })
            })
            .transpose()
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/storages",
    request_body = StorageRequest,
    responses(
        (status = 201, description = "Storage created", body = StorageBody),
        (status = 400, description = "Address already has a storage", body = ErrorSchema),
        (status = 404, description = "No such address", body = ErrorSchema)
    ),
    tags = ["storages"],
    operation_id = "createStorage"
)]
#[post("/storages")]
pub async fn create_storage(
    state: web::Data<HttpState>,
    payload: web::Json<StorageRequest>,
) -> ApiResult<HttpResponse> {
    let address_id = AddressId::new(payload.address_id()?);
    let storage = state.command.create_storage(address_id).await?;
    Ok(HttpResponse::Created().json(StorageBody::from(storage)))
}

#[utoipa::path(
    get,
    path = "/api/v1/storages",
    responses((status = 200, description = "Every storage", body = [StorageBody])),
    tags = ["storages"],
    operation_id = "listStorages"
)]
#[get("/storages")]
pub async fn list_storages(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<StorageBody>>> {
    Ok(web::Json(bodies(state.query.storages().await?)))
}

#[utoipa::path(
    get,
    path = "/api/v1/storages/{id}",
    params(("id" = i64, Path, description = "Storage identifier")),
    responses(
        (status = 200, description = "The storage", body = StorageBody),
        (status = 404, description = "No such storage", body = ErrorSchema)
    ),
    tags = ["storages"],
    operation_id = "getStorage"
)]
#[get("/storages/{id}")]
pub async fn get_storage(
    state: web::Data<HttpState>,
    id: web::Path<i64>,
) -> ApiResult<web::Json<StorageBody>> {
    let storage = state.query.storage(StorageId::new(id.into_inner())).await?;
    Ok(web::Json(storage.into()))
}

/// Bikes currently held by a storage, optionally of one colour.
#[utoipa::path(
    get,
    path = "/api/v1/storages/{id}/bikes",
    params(("id" = i64, Path, description = "Storage identifier"), BikeFilter),
    responses(
        (status = 200, description = "Bikes in the storage", body = [BikeBody]),
        (status = 400, description = "Unknown colour", body = ErrorSchema),
        (status = 404, description = "No such storage", body = ErrorSchema)
    ),
    tags = ["storages"],
    operation_id = "listStorageBikes"
)]
#[get("/storages/{id}/bikes")]
pub async fn list_storage_bikes(
    state: web::Data<HttpState>,
    id: web::Path<i64>,
    filter: web::Query<BikeFilter>,
) -> ApiResult<web::Json<Vec<BikeBody>>> {
    let color = filter.color()?;
    let bikes = state
        .query
        .storage_bikes(StorageId::new(id.into_inner()), color)
        .await?;
    Ok(web::Json(bodies(bikes)))
}

#[utoipa::path(
    get,
    path = "/api/v1/storages/{id}/orders",
    params(("id" = i64, Path, description = "Storage identifier")),
    responses(
        (status = 200, description = "Orders placed at the storage", body = [OrderBody]),
        (status = 404, description = "No such storage", body = ErrorSchema)
    ),
    tags = ["storages"],
    operation_id = "listStorageOrders"
)]
#[get("/storages/{id}/orders")]
pub async fn list_storage_orders(
    state: web::Data<HttpState>,
    id: web::Path<i64>,
) -> ApiResult<web::Json<Vec<OrderBody>>> {
    let orders = state
        .query
        .storage_orders(StorageId::new(id.into_inner()))
        .await?;
    Ok(web::Json(bodies(orders)))
}

/// Register the storage endpoints.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_storage)
        .service(list_storages)
        .service(get_storage)
        .service(list_storage_bikes)
        .service(list_storage_orders);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{create, get_json, post_json, rental_app};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[actix_web::test]
    async fn address_creation_provides_storage() {
        let app = test::init_service(rental_app()).await;
        let id = create(
            &app,
            "/api/v1/addresses",
            json!({"city": "MOSCOW", "street": "Lenina", "house": 18}),
        )
        .await;

        let storage: StorageBody = get_json(&app, &format!("/api/v1/storages/{id}")).await;
        assert_eq!(storage.id, id);
        assert_eq!(storage.address.street, "Lenina");
    }

    #[rstest]
    #[actix_web::test]
    async fn second_storage_for_address_is_rejected() {
        let app = test::init_service(rental_app()).await;
        let id = create(
            &app,
            "/api/v1/addresses",
            json!({"city": "MOSCOW", "street": "Lenina", "house": 18}),
        )
        .await;

        let res = post_json(&app, "/api/v1/storages", json!({"addressId": id})).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["entity"], "storage");
    }

    #[rstest]
    #[actix_web::test]
    async fn storage_for_missing_address_is_not_found() {
        let app = test::init_service(rental_app()).await;
        let res = post_json(&app, "/api/v1/storages", json!({"addressId": 5})).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[case("", 2)]
    #[case("?color=RED", 1)]
    #[case("?color=WHITE", 0)]
    #[actix_web::test]
    async fn bikes_filter_by_colour(#[case] query: &str, #[case] expected: usize) {
        let app = test::init_service(rental_app()).await;
        let storage = create(
            &app,
            "/api/v1/addresses",
            json!({"city": "MOSCOW", "street": "Lenina", "house": 18}),
        )
        .await;
        for color in ["RED", "BLUE"] {
            create(
                &app,
                "/api/v1/bikes",
                json!({"color": color, "size": "M", "label": "STELS", "storageId": storage}),
            )
            .await;
        }

        let bikes: Vec<BikeBody> =
            get_json(&app, &format!("/api/v1/storages/{storage}/bikes{query}")).await;
        assert_eq!(bikes.len(), expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_colour_filter_is_bad_request() {
        let app = test::init_service(rental_app()).await;
        create(
            &app,
            "/api/v1/addresses",
            json!({"city": "MOSCOW", "street": "Lenina", "house": 18}),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/api/v1/storages/1/bikes?color=PINK")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
