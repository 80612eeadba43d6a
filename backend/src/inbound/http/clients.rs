//! Client endpoints, including name search and the client's comments and
//! orders.

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::domain::Error;
use crate::domain::rental::{ClientId, WriteIntent};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{ClientBody, ClientRequest, CommentBody, OrderBody, bodies};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Name fragment to search for.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct NameSearch {
    /// Case-sensitive substring of the client's name.
    pub name: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/clients",
    request_body = ClientRequest,
    responses(
        (status = 201, description = "Client created", body = ClientBody),
        (status = 400, description = "Invalid client or email taken", body = ErrorSchema)
    ),
    tags = ["clients"],
    operation_id = "createClient"
)]
#[post("/clients")]
pub async fn create_client(
    state: web::Data<HttpState>,
    payload: web::Json<ClientRequest>,
) -> ApiResult<HttpResponse> {
    let draft = payload.parse(WriteIntent::Create)?;
    let client = state.command.create_client(draft).await?;
    Ok(HttpResponse::Created().json(ClientBody::from(client)))
}

#[utoipa::path(
    get,
    path = "/api/v1/clients",
    responses((status = 200, description = "Every client", body = [ClientBody])),
    tags = ["clients"],
    operation_id = "listClients"
)]
#[get("/clients")]
pub async fn list_clients(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<ClientBody>>> {
    Ok(web::Json(bodies(state.query.clients().await?)))
}

/// Clients whose name contains the given fragment.
#[utoipa::path(
    get,
    path = "/api/v1/clients/search",
    params(NameSearch),
    responses(
        (status = 200, description = "Matching clients", body = [ClientBody]),
        (status = 400, description = "Missing name fragment", body = ErrorSchema)
    ),
    tags = ["clients"],
    operation_id = "searchClients"
)]
#[get("/clients/search")]
pub async fn search_clients(
    state: web::Data<HttpState>,
    search: web::Query<NameSearch>,
) -> ApiResult<web::Json<Vec<ClientBody>>> {
    let fragment = search.name.as_deref().ok_or_else(|| {
        Error::invalid_request("name is required")
            .with_details(json!({ "field": "name", "code": "missing_name" }))
    })?;
    let clients = state.query.search_clients(fragment).await?;
    Ok(web::Json(bodies(clients)))
}

#[utoipa::path(
    get,
    path = "/api/v1/clients/{id}",
    params(("id" = i64, Path, description = "Client identifier")),
    responses(
        (status = 200, description = "The client", body = ClientBody),
        (status = 404, description = "No such client", body = ErrorSchema)
    ),
    tags = ["clients"],
    operation_id = "getClient"
)]
#[get("/clients/{id}")]
pub async fn get_client(
    state: web::Data<HttpState>,
    id: web::Path<i64>,
) -> ApiResult<web::Json<ClientBody>> {
    let client = state.query.client(ClientId::new(id.into_inner())).await?;
    Ok(web::Json(client.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/clients/{id}/comments",
    params(("id" = i64, Path, description = "Client identifier")),
    responses(
        (status = 200, description = "Comments about the client", body = [CommentBody]),
        (status = 404, description = "No such client", body = ErrorSchema)
    ),
    tags = ["clients"],
    operation_id = "listClientComments"
)]
#[get("/clients/{id}/comments")]
pub async fn list_client_comments(
    state: web::Data<HttpState>,
    id: web::Path<i64>,
) -> ApiResult<web::Json<Vec<CommentBody>>> {
    let comments = state
        .query
        .client_comments(ClientId::new(id.into_inner()))
        .await?;
    Ok(web::Json(bodies(comments)))
}

#[utoipa::path(
    get,
    path = "/api/v1/clients/{id}/orders",
    params(("id" = i64, Path, description = "Client identifier")),
    responses(
        (status = 200, description = "Orders placed by the client", body = [OrderBody]),
        (status = 404, description = "No such client", body = ErrorSchema)
    ),
    tags = ["clients"],
    operation_id = "listClientOrders"
)]
#[get("/clients/{id}/orders")]
pub async fn list_client_orders(
    state: web::Data<HttpState>,
    id: web::Path<i64>,
) -> ApiResult<web::Json<Vec<OrderBody>>> {
    let orders = state
        .query
        .client_orders(ClientId::new(id.into_inner()))
        .await?;
    Ok(web::Json(bodies(orders)))
}

/// Replace a client's email and name. The email may stay the same.
#[utoipa::path(
    post,
    path = "/api/v1/clients/{id}/update",
    params(("id" = i64, Path, description = "Client identifier")),
    request_body = ClientRequest,
    responses(
        (status = 202, description = "Client updated", body = ClientBody),
        (status = 400, description = "Invalid client or email taken", body = ErrorSchema),
        (status = 404, description = "No such client", body = ErrorSchema)
    ),
    tags = ["clients"],
    operation_id = "updateClient"
)]
#[post("/clients/{id}/update")]
pub async fn update_client(
    state: web::Data<HttpState>,
    id: web::Path<i64>,
    payload: web::Json<ClientRequest>,
) -> ApiResult<HttpResponse> {
    let draft = payload.parse(WriteIntent::Update)?;
    let client = state
        .command
        .update_client(ClientId::new(id.into_inner()), draft)
        .await?;
    Ok(HttpResponse::Accepted().json(ClientBody::from(client)))
}

/// Register the client endpoints. Search precedes `/clients/{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_client)
        .service(list_clients)
        .service(search_clients)
        .service(get_client)
        .service(list_client_comments)
        .service(list_client_orders)
        .service(update_client);
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
    async fn duplicate_email_is_rejected() {
        let app = test::init_service(rental_app()).await;
        let payload = json!({"email": "ivan@example.com", "name": "Ivan"});
        create(&app, "/api/v1/clients", payload.clone()).await;

        let res = post_json(&app, "/api/v1/clients", payload).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["code"], "not_created");
    }

    #[rstest]
    #[actix_web::test]
    async fn client_may_keep_own_email() {
        let app = test::init_service(rental_app()).await;
        let id = create(
            &app,
            "/api/v1/clients",
            json!({"email": "ivan@example.com", "name": "Ivan"}),
        )
        .await;

        let res = post_json(
            &app,
            &format!("/api/v1/clients/{id}/update"),
            json!({"email": "ivan@example.com", "name": "Ivan Petrov"}),
        )
        .await;
        assert_eq!(res.status(), StatusCode::ACCEPTED);
        let body: ClientBody = test::read_body_json(res).await;
        assert_eq!(body.name, "Ivan Petrov");
    }

    #[rstest]
    #[case("Iv", 1)]
    #[case("n", 2)]
    #[case("iv", 0)]
    #[actix_web::test]
    async fn search_matches_substrings(#[case] fragment: &str, #[case] expected: usize) {
        let app = test::init_service(rental_app()).await;
        create(&app, "/api/v1/clients", json!({"email": "ivan@example.com", "name": "Ivan"})).await;
        create(&app, "/api/v1/clients", json!({"email": "anna@example.com", "name": "Anna"})).await;

        let clients: Vec<ClientBody> =
            get_json(&app, &format!("/api/v1/clients/search?name={fragment}")).await;
        assert_eq!(clients.len(), expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn search_without_name_is_bad_request() {
        let app = test::init_service(rental_app()).await;
        let req = test::TestRequest::get().uri("/api/v1/clients/search").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[actix_web::test]
    async fn comments_appear_under_their_client() {
        let app = test::init_service(rental_app()).await;
        let id = create(
            &app,
            "/api/v1/clients",
            json!({"email": "ivan@example.com", "name": "Ivan"}),
        )
        .await;
        create(
            &app,
            "/api/v1/comments",
            json!({"clientId": id, "description": "Polite"}),
        )
        .await;

        let comments: Vec<CommentBody> =
            get_json(&app, &format!("/api/v1/clients/{id}/comments")).await;
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].description, "Polite");
    }
}
