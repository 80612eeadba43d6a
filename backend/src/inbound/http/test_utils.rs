//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::Trace;
use crate::domain::RentalService;
use crate::inbound::http::configure_api;
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::InMemoryRentalRepository;

/// Application with every rental endpoint over a fresh in-memory store.
pub fn rental_app() -> App<
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

/// POST a JSON payload.
pub async fn post_json<S>(app: &S, uri: &str, payload: Value) -> ServiceResponse
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri(uri)
        .set_json(payload)
        .to_request();
    test::call_service(app, req).await
}

/// GET `uri` and decode a successful JSON body.
pub async fn get_json<S, T>(app: &S, uri: &str) -> T
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    T: DeserializeOwned,
{
    let req = test::TestRequest::get().uri(uri).to_request();
    test::call_and_read_body_json(app, req).await
}

/// POST a payload that must succeed and return the `id` of the created entity.
pub async fn create<S>(app: &S, uri: &str, payload: Value) -> i64
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = post_json(app, uri, payload).await;
    assert!(res.status().is_success(), "POST {uri} failed: {}", res.status());
    let body: Value = test::read_body_json(res).await;
    body["id"].as_i64().expect("created entity carries an id")
}
