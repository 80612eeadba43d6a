//! Address endpoints.
//!
//! ```text
//! POST /api/v1/addresses {"city":"MOSCOW","street":"Lenina","house":18}
//! GET  /api/v1/addresses/1
//! POST /api/v1/addresses/1/update {"city":"MOSCOW","street":"Lenina","house":20}
//! ```

use actix_web::{HttpResponse, get, post, web};

use crate::domain::rental::{AddressId, WriteIntent};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{AddressBody, AddressRequest, bodies};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Create an address together with its storage.
#[utoipa::path(
    post,
    path = "/api/v1/addresses",
    request_body = AddressRequest,
    responses(
        (status = 201, description = "Address and storage created", body = AddressBody),
        (status = 400, description = "Invalid or duplicate address", body = ErrorSchema),
        (status = 503, description = "Rental store unavailable", body = ErrorSchema)
    ),
    tags = ["addresses"],
    operation_id = "createAddress"
)]
#[post("/addresses")]
pub async fn create_address(
    state: web::Data<HttpState>,
    payload: web::Json<AddressRequest>,
) -> ApiResult<HttpResponse> {
    let draft = payload.parse(WriteIntent::Create)?;
    let storage = state.command.create_address(draft).await?;
    Ok(HttpResponse::Created().json(AddressBody::from(storage.address)))
}

#[utoipa::path(
    get,
    path = "/api/v1/addresses",
    responses(
        (status = 200, description = "Every address", body = [AddressBody]),
        (status = 503, description = "Rental store unavailable", body = ErrorSchema)
    ),
    tags = ["addresses"],
    operation_id = "listAddresses"
)]
#[get("/addresses")]
pub async fn list_addresses(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<AddressBody>>> {
    let addresses = state.query.addresses().await?;
    Ok(web::Json(bodies(addresses)))
}

#[utoipa::path(
    get,
    path = "/api/v1/addresses/{id}",
    params(("id" = i64, Path, description = "Address identifier")),
    responses(
        (status = 200, description = "The address", body = AddressBody),
        (status = 404, description = "No such address", body = ErrorSchema)
    ),
    tags = ["addresses"],
    operation_id = "getAddress"
)]
#[get("/addresses/{id}")]
pub async fn get_address(
    state: web::Data<HttpState>,
    id: web::Path<i64>,
) -> ApiResult<web::Json<AddressBody>> {
    let address = state.query.address(AddressId::new(id.into_inner())).await?;
    Ok(web::Json(address.into()))
}

/// Replace the city, street and house of an address.
///
/// Re-submitting an address's own values is accepted.
#[utoipa::path(
    post,
    path = "/api/v1/addresses/{id}/update",
    params(("id" = i64, Path, description = "Address identifier")),
    request_body = AddressRequest,
    responses(
        (status = 202, description = "Address updated", body = AddressBody),
        (status = 400, description = "Invalid or duplicate address", body = ErrorSchema),
        (status = 404, description = "No such address", body = ErrorSchema)
    ),
    tags = ["addresses"],
    operation_id = "updateAddress"
)]
#[post("/addresses/{id}/update")]
pub async fn update_address(
    state: web::Data<HttpState>,
    id: web::Path<i64>,
    payload: web::Json<AddressRequest>,
) -> ApiResult<HttpResponse> {
    let draft = payload.parse(WriteIntent::Update)?;
    let address = state
        .command
        .update_address(AddressId::new(id.into_inner()), draft)
        .await?;
    Ok(HttpResponse::Accepted().json(AddressBody::from(address)))
}

/// Register the address endpoints.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_address)
        .service(list_addresses)
        .service(get_address)
        .service(update_address);
}
