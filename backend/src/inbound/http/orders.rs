//! Order endpoints.
//!
//! Creating or reassigning an order updates the storage, client and bike
//! listings it touches in one step; a rejected request leaves all of them
//! unchanged.

use actix_web::{HttpResponse, get, post, web};

use crate::domain::rental::{OrderId, WriteIntent};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{OrderBody, OrderRequest, bodies};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Place an order. Every bike in it becomes unavailable.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = OrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderBody),
        (status = 400, description = "Invalid order", body = ErrorSchema),
        (status = 404, description = "Client, storage or bike missing", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "createOrder"
)]
#[post("/orders")]
pub async fn create_order(
    state: web::Data<HttpState>,
    payload: web::Json<OrderRequest>,
) -> ApiResult<HttpResponse> {
    let draft = payload.parse(WriteIntent::Create)?;
    let order = state.command.create_order(draft).await?;
    Ok(HttpResponse::Created().json(OrderBody::from(order)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    responses((status = 200, description = "Every order", body = [OrderBody])),
    tags = ["orders"],
    operation_id = "listOrders"
)]
#[get("/orders")]
pub async fn list_orders(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<OrderBody>>> {
    Ok(web::Json(bodies(state.query.orders().await?)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = i64, Path, description = "Order identifier")),
    responses(
        (status = 200, description = "The order", body = OrderBody),
        (status = 404, description = "No such order", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "getOrder"
)]
#[get("/orders/{id}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    id: web::Path<i64>,
) -> ApiResult<web::Json<OrderBody>> {
    let order = state.query.order(OrderId::new(id.into_inner())).await?;
    Ok(web::Json(order.into()))
}

/// Point an order at a new client, storage and bike set.
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/update",
    params(("id" = i64, Path, description = "Order identifier")),
    request_body = OrderRequest,
    responses(
        (status = 202, description = "Order reassigned", body = OrderBody),
        (status = 400, description = "Invalid order", body = ErrorSchema),
        (status = 404, description = "Order, client, storage or bike missing", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "updateOrder"
)]
#[post("/orders/{id}/update")]
pub async fn update_order(
    state: web::Data<HttpState>,
    id: web::Path<i64>,
    payload: web::Json<OrderRequest>,
) -> ApiResult<HttpResponse> {
    let draft = payload.parse(WriteIntent::Update)?;
    let order = state
        .command
        .update_order(OrderId::new(id.into_inner()), draft)
        .await?;
    Ok(HttpResponse::Accepted().json(OrderBody::from(order)))
}

/// Register the order endpoints.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_order)
        .service(list_orders)
        .service(get_order)
        .service(update_order);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::dto::BikeBody;
    use crate::inbound::http::test_utils::{create, get_json, post_json, rental_app};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[actix_web::test]
    async fn order_with_missing_bike_changes_nothing() {
        let app = test::init_service(rental_app()).await;
        let storage = create(
            &app,
            "/api/v1/addresses",
            json!({"city": "MOSCOW", "street": "Lenina", "house": 18}),
        )
        .await;
        let client = create(
            &app,
            "/api/v1/clients",
            json!({"email": "ivan@example.com", "name": "Ivan"}),
        )
        .await;
        let bike = create(
            &app,
            "/api/v1/bikes",
            json!({"color": "RED", "size": "M", "label": "STELS", "storageId": storage}),
        )
        .await;

        let res = post_json(
            &app,
            "/api/v1/orders",
            json!({"clientId": client, "storageId": storage, "bikeIds": [bike, 99]}),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let orders: Vec<OrderBody> = get_json(&app, "/api/v1/orders").await;
        let stored: BikeBody = get_json(&app, &format!("/api/v1/bikes/{bike}")).await;
        assert!(orders.is_empty());
        assert!(stored.available);
    }

    #[rstest]
    #[actix_web::test]
    async fn empty_bike_list_is_rejected() {
        let app = test::init_service(rental_app()).await;
        let res = post_json(
            &app,
            "/api/v1/orders",
            json!({"clientId": 1, "storageId": 1, "bikeIds": []}),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(
            body["details"]["reason"],
            "bikes - at least one bike is required; "
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn reassigning_missing_order_is_not_found() {
        let app = test::init_service(rental_app()).await;
        let res = post_json(
            &app,
            "/api/v1/orders/8/update",
            json!({"clientId": 1, "storageId": 1, "bikeIds": [1]}),
        )
        .await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["entity"], "order");
    }
}
