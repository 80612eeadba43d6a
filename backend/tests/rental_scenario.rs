//! End-to-end rental scenarios driven through the HTTP surface against the
//! in-memory store.

use std::sync::Arc;

use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use rstest::rstest;
use serde_json::{Value, json};

use bikerent::Trace;
use bikerent::domain::{RentalService, TRACE_ID_HEADER};
use bikerent::inbound::http::configure_api;
use bikerent::inbound::http::dto::{BikeBody, ClientBody, OrderBody, StorageBody};
use bikerent::inbound::http::state::HttpState;
use bikerent::outbound::memory::InMemoryRentalRepository;

fn rental_app() -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let service = RentalService::new(Arc::new(InMemoryRentalRepository::new()));
    App::new()
        .app_data(web::Data::new(HttpState::from_service(Arc::new(service))))
        .wrap(Trace)
        .service(web::scope("/api/v1").configure(configure_api))
}

async fn post<S>(app: &S, uri: &str, payload: Value) -> ServiceResponse
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri(uri)
        .set_json(payload)
        .to_request();
    test::call_service(app, req).await
}

async fn created<S>(app: &S, uri: &str, payload: Value) -> i64
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = post(app, uri, payload).await;
    assert_eq!(res.status(), StatusCode::CREATED, "POST {uri}");
    let body: Value = test::read_body_json(res).await;
    body["id"].as_i64().expect("id")
}

async fn get<S, T>(app: &S, uri: &str) -> T
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    T: serde::de::DeserializeOwned,
{
    let req = test::TestRequest::get().uri(uri).to_request();
    test::call_and_read_body_json(app, req).await
}

fn order_ids(orders: &[OrderBody]) -> Vec<i64> {
    orders.iter().map(|order| order.id).collect()
}

#[rstest]
#[actix_web::test]
async fn order_for_moscow_storage_links_every_side() {
    let app = test::init_service(rental_app()).await;

    let address = created(
        &app,
        "/api/v1/addresses",
        json!({"city": "MOSCOW", "street": "Lenina", "house": 18}),
    )
    .await;
    let storage: StorageBody = get(&app, &format!("/api/v1/storages/{address}")).await;
    assert_eq!(storage.id, address);

    let bike = created(
        &app,
        "/api/v1/bikes",
        json!({"color": "RED", "size": "L", "label": "STELS", "storageId": storage.id}),
    )
    .await;
    let fresh: BikeBody = get(&app, &format!("/api/v1/bikes/{bike}")).await;
    assert!(fresh.available);

    let client = created(
        &app,
        "/api/v1/clients",
        json!({"email": "ivan@example.com", "name": "Ivan"}),
    )
    .await;
    let order = created(
        &app,
        "/api/v1/orders",
        json!({"clientId": client, "storageId": storage.id, "bikeIds": [bike]}),
    )
    .await;

    let rented: BikeBody = get(&app, &format!("/api/v1/bikes/{bike}")).await;
    let bike_orders: Vec<OrderBody> = get(&app, &format!("/api/v1/bikes/{bike}/orders")).await;
    let storage_orders: Vec<OrderBody> =
        get(&app, &format!("/api/v1/storages/{}/orders", storage.id)).await;
    let client_orders: Vec<OrderBody> =
        get(&app, &format!("/api/v1/clients/{client}/orders")).await;

    assert!(!rented.available);
    assert_eq!(order_ids(&bike_orders), vec![order]);
    assert_eq!(order_ids(&storage_orders), vec![order]);
    assert_eq!(order_ids(&client_orders), vec![order]);
}

#[rstest]
#[actix_web::test]
async fn failed_reassignment_keeps_old_associations() {
    let app = test::init_service(rental_app()).await;
    let north = created(
        &app,
        "/api/v1/addresses",
        json!({"city": "MOSCOW", "street": "Lenina", "house": 18}),
    )
    .await;
    let south = created(
        &app,
        "/api/v1/addresses",
        json!({"city": "NOVOSIBIRSK", "street": "Lenina", "house": 18}),
    )
    .await;
    let client = created(
        &app,
        "/api/v1/clients",
        json!({"email": "ivan@example.com", "name": "Ivan"}),
    )
    .await;
    let bike = created(
        &app,
        "/api/v1/bikes",
        json!({"color": "RED", "size": "L", "label": "STELS", "storageId": north}),
    )
    .await;
    let order = created(
        &app,
        "/api/v1/orders",
        json!({"clientId": client, "storageId": north, "bikeIds": [bike]}),
    )
    .await;

    let res = post(
        &app,
        &format!("/api/v1/orders/{order}/update"),
        json!({"clientId": client, "storageId": south, "bikeIds": [bike, 404]}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(res.headers().contains_key(TRACE_ID_HEADER));

    let stored: OrderBody = get(&app, &format!("/api/v1/orders/{order}")).await;
    let north_orders: Vec<OrderBody> = get(&app, &format!("/api/v1/storages/{north}/orders")).await;
    let south_orders: Vec<OrderBody> = get(&app, &format!("/api/v1/storages/{south}/orders")).await;
    let bike_orders: Vec<OrderBody> = get(&app, &format!("/api/v1/bikes/{bike}/orders")).await;

    assert_eq!(stored.storage_id, north);
    assert_eq!(stored.bike_ids, vec![bike]);
    assert_eq!(order_ids(&north_orders), vec![order]);
    assert!(south_orders.is_empty());
    assert_eq!(order_ids(&bike_orders), vec![order]);
}

#[rstest]
#[actix_web::test]
async fn reassignment_moves_order_between_owners() {
    let app = test::init_service(rental_app()).await;
    let north = created(
        &app,
        "/api/v1/addresses",
        json!({"city": "MOSCOW", "street": "Lenina", "house": 18}),
    )
    .await;
    let south = created(
        &app,
        "/api/v1/addresses",
        json!({"city": "KRASNODAR", "street": "Krasnaya", "house": 1}),
    )
    .await;
    let ivan = created(
        &app,
        "/api/v1/clients",
        json!({"email": "ivan@example.com", "name": "Ivan"}),
    )
    .await;
    let olga = created(
        &app,
        "/api/v1/clients",
        json!({"email": "olga@example.com", "name": "Olga"}),
    )
    .await;
    let first = created(
        &app,
        "/api/v1/bikes",
        json!({"color": "RED", "size": "L", "label": "STELS", "storageId": north}),
    )
    .await;
    let second = created(
        &app,
        "/api/v1/bikes",
        json!({"color": "BLUE", "size": "S", "label": "SCOTT", "storageId": south}),
    )
    .await;
    let order = created(
        &app,
        "/api/v1/orders",
        json!({"clientId": ivan, "storageId": north, "bikeIds": [first]}),
    )
    .await;

    let res = post(
        &app,
        &format!("/api/v1/orders/{order}/update"),
        json!({"clientId": olga, "storageId": south, "bikeIds": [second]}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::ACCEPTED);

    let ivan_orders: Vec<OrderBody> = get(&app, &format!("/api/v1/clients/{ivan}/orders")).await;
    let olga_orders: Vec<OrderBody> = get(&app, &format!("/api/v1/clients/{olga}/orders")).await;
    let first_orders: Vec<OrderBody> = get(&app, &format!("/api/v1/bikes/{first}/orders")).await;
    let second_orders: Vec<OrderBody> = get(&app, &format!("/api/v1/bikes/{second}/orders")).await;
    let south_orders: Vec<OrderBody> = get(&app, &format!("/api/v1/storages/{south}/orders")).await;

    assert!(ivan_orders.is_empty());
    assert_eq!(order_ids(&olga_orders), vec![order]);
    assert!(first_orders.is_empty());
    assert_eq!(order_ids(&second_orders), vec![order]);
    assert_eq!(order_ids(&south_orders), vec![order]);
}

#[rstest]
#[case(json!({"city": "MOSCOW", "street": "Lenina", "house": 18}), StatusCode::BAD_REQUEST)]
#[case(json!({"city": "MOSCOW", "street": "Lenina", "house": 19}), StatusCode::CREATED)]
#[case(json!({"city": "KRASNODAR", "street": "Lenina", "house": 18}), StatusCode::CREATED)]
#[case(json!({"city": "MOSCOW", "street": "Mira", "house": 18}), StatusCode::CREATED)]
#[actix_web::test]
async fn addresses_collide_only_on_full_natural_key(
    #[case] second: Value,
    #[case] expected: StatusCode,
) {
    let app = test::init_service(rental_app()).await;
    created(
        &app,
        "/api/v1/addresses",
        json!({"city": "MOSCOW", "street": "Lenina", "house": 18}),
    )
    .await;

    let res = post(&app, "/api/v1/addresses", second).await;
    assert_eq!(res.status(), expected);
}

#[rstest]
#[actix_web::test]
async fn client_email_is_unique_except_for_self() {
    let app = test::init_service(rental_app()).await;
    let ivan = created(
        &app,
        "/api/v1/clients",
        json!({"email": "ivan@example.com", "name": "Ivan"}),
    )
    .await;

    let duplicate = post(
        &app,
        "/api/v1/clients",
        json!({"email": "ivan@example.com", "name": "Other Ivan"}),
    )
    .await;
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);

    let res = post(
        &app,
        &format!("/api/v1/clients/{ivan}/update"),
        json!({"email": "ivan@example.com", "name": "Ivan"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    let clients: Vec<ClientBody> = get(&app, "/api/v1/clients").await;
    assert_eq!(clients.len(), 1);
}
