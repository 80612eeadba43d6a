//! Bike endpoints.

use actix_web::{HttpResponse, get, post, web};

use crate::domain::rental::{BikeId, WriteIntent};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{BikeBody, BikeRequest, OrderBody, bodies};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Register a new bike in an existing storage. New bikes are available.
#[utoipa::path(
    post,
    path = "/api/v1/bikes",
    request_body = BikeRequest,
    responses(
        (status = 201, description = "Bike created", body = BikeBody),
        (status = 400, description = "Invalid bike", body = ErrorSchema),
        (status = 404, description = "No such storage", body = ErrorSchema)
    ),
    tags = ["bikes"],
    operation_id = "createBike"
)]
#[post("/bikes")]
pub async fn create_bike(
    state: web::Data<HttpState>,
    payload: web::Json<BikeRequest>,
) -> ApiResult<HttpResponse> {
    let draft = payload.parse(WriteIntent::Create)?;
    let bike = state.command.create_bike(draft).await?;
    Ok(HttpResponse::Created().json(BikeBody::from(bike)))
}

#[utoipa::path(
    get,
    path = "/api/v1/bikes",
    responses((status = 200, description = "Every bike", body = [BikeBody])),
    tags = ["bikes"],
    operation_id = "listBikes"
)]
#[get("/bikes")]
pub async fn list_bikes(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<BikeBody>>> {
    Ok(web::Json(bodies(state.query.bikes().await?)))
}

#[utoipa::path(
    get,
    path = "/api/v1/bikes/{id}",
    params(("id" = i64, Path, description = "Bike identifier")),
    responses(
        (status = 200, description = "The bike", body = BikeBody),
        (status = 404, description = "No such bike", body = ErrorSchema)
    ),
    tags = ["bikes"],
    operation_id = "getBike"
)]
#[get("/bikes/{id}")]
pub async fn get_bike(
    state: web::Data<HttpState>,
    id: web::Path<i64>,
) -> ApiResult<web::Json<BikeBody>> {
    let bike = state.query.bike(BikeId::new(id.into_inner())).await?;
    Ok(web::Json(bike.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/bikes/{id}/orders",
    params(("id" = i64, Path, description = "Bike identifier")),
    responses(
        (status = 200, description = "Orders including the bike", body = [OrderBody]),
        (status = 404, description = "No such bike", body = ErrorSchema)
    ),
    tags = ["bikes"],
    operation_id = "listBikeOrders"
)]
#[get("/bikes/{id}/orders")]
pub async fn list_bike_orders(
    state: web::Data<HttpState>,
    id: web::Path<i64>,
) -> ApiResult<web::Json<Vec<OrderBody>>> {
    let orders = state.query.bike_orders(BikeId::new(id.into_inner())).await?;
    Ok(web::Json(bodies(orders)))
}

/// Update a bike's attributes and move it to the named storage.
///
/// The bike leaves its previous storage's listing in the same step.
#[utoipa::path(
    post,
    path = "/api/v1/bikes/{id}/update",
    params(("id" = i64, Path, description = "Bike identifier")),
    request_body = BikeRequest,
    responses(
        (status = 202, description = "Bike updated", body = BikeBody),
        (status = 400, description = "Invalid bike", body = ErrorSchema),
        (status = 404, description = "No such bike or storage", body = ErrorSchema)
    ),
    tags = ["bikes"],
    operation_id = "updateBike"
)]
#[post("/bikes/{id}/update")]
pub async fn update_bike(
    state: web::Data<HttpState>,
    id: web::Path<i64>,
    payload: web::Json<BikeRequest>,
) -> ApiResult<HttpResponse> {
    let draft = payload.parse(WriteIntent::Update)?;
    let bike = state
        .command
        .update_bike(BikeId::new(id.into_inner()), draft)
        .await?;
    Ok(HttpResponse::Accepted().json(BikeBody::from(bike)))
}

/// Register the bike endpoints.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_bike)
        .service(list_bikes)
        .service(get_bike)
        .service(list_bike_orders)
        .service(update_bike);
}
