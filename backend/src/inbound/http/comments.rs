//! Comment endpoints.

use actix_web::{HttpResponse, get, post, web};

use crate::domain::rental::CommentId;
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{CommentBody, CommentRequest, bodies};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Attach a comment to an existing client.
#[utoipa::path(
    post,
    path = "/api/v1/comments",
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentBody),
        (status = 400, description = "Invalid comment", body = ErrorSchema),
        (status = 404, description = "No such client", body = ErrorSchema)
    ),
    tags = ["comments"],
    operation_id = "createComment"
)]
#[post("/comments")]
pub async fn create_comment(
    state: web::Data<HttpState>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<HttpResponse> {
    let draft = payload.parse()?;
    let comment = state.command.create_comment(draft).await?;
    Ok(HttpResponse::Created().json(CommentBody::from(comment)))
}

#[utoipa::path(
    get,
    path = "/api/v1/comments",
    responses((status = 200, description = "Every comment", body = [CommentBody])),
    tags = ["comments"],
    operation_id = "listComments"
)]
#[get("/comments")]
pub async fn list_comments(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<CommentBody>>> {
    Ok(web::Json(bodies(state.query.comments().await?)))
}

#[utoipa::path(
    get,
    path = "/api/v1/comments/{id}",
    params(("id" = i64, Path, description = "Comment identifier")),
    responses(
        (status = 200, description = "The comment", body = CommentBody),
        (status = 404, description = "No such comment", body = ErrorSchema)
    ),
    tags = ["comments"],
    operation_id = "getComment"
)]
#[get("/comments/{id}")]
pub async fn get_comment(
    state: web::Data<HttpState>,
    id: web::Path<i64>,
) -> ApiResult<web::Json<CommentBody>> {
    let comment = state.query.comment(CommentId::new(id.into_inner())).await?;
    Ok(web::Json(comment.into()))
}

/// Register the comment endpoints.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_comment)
        .service(list_comments)
        .service(get_comment);
}
