use actix_web::{web, HttpResponse, ResponseError};

use crate::{
    database::LikeStore,
    models::{LikeRequest, LikerUserResponse, TemplateLikesResponse},
    services::like_service,
    utils::AppError,
};

/// Store failures carry the operation name; state conflicts use the error's own message
fn like_error_response(e: &AppError, operation: &str) -> HttpResponse {
    match e {
        AppError::DatabaseError(_) => HttpResponse::InternalServerError().json(serde_json::json!({
            "message": format!("Error {} the template", operation),
            "error": e.to_string()
        })),
        _ => e.error_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/like",
    tag = "Likes",
    request_body = LikeRequest,
    responses(
        (status = 200, description = "Template liked"),
        (status = 400, description = "Template already liked or invalid body"),
        (status = 500, description = "Database error")
    )
)]
pub async fn like_template(
    store: web::Data<dyn LikeStore>,
    body: web::Json<LikeRequest>,
) -> HttpResponse {
    log::info!("👍 POST /api/like - email: {}, template: {}", body.email, body.template_id);

    match like_service::like(store.get_ref(), &body.email, &body.template_id).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Template liked successfully"
        })),
        Err(e) => {
            log::warn!("❌ Like failed: {} - {}", body.template_id, e);
            like_error_response(&e, "liking")
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/unlike",
    tag = "Likes",
    request_body = LikeRequest,
    responses(
        (status = 200, description = "Template unliked"),
        (status = 400, description = "Template not liked yet or invalid body"),
        (status = 500, description = "Database error")
    )
)]
pub async fn unlike_template(
    store: web::Data<dyn LikeStore>,
    body: web::Json<LikeRequest>,
) -> HttpResponse {
    log::info!("👎 POST /api/unlike - email: {}, template: {}", body.email, body.template_id);

    match like_service::unlike(store.get_ref(), &body.email, &body.template_id).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Template unliked successfully"
        })),
        Err(e) => {
            log::warn!("❌ Unlike failed: {} - {}", body.template_id, e);
            like_error_response(&e, "unliking")
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/like-status/{email}",
    tag = "Likes",
    params(("email" = String, Path, description = "User email")),
    responses(
        (status = 200, description = "Matching user documents", body = [LikerUserResponse])
    )
)]
pub async fn like_status(store: web::Data<dyn LikeStore>, path: web::Path<String>) -> HttpResponse {
    let email = path.into_inner();

    match like_service::like_status(store.get_ref(), &email).await {
        Ok(users) => HttpResponse::Ok().json(
            users
                .into_iter()
                .map(LikerUserResponse::from)
                .collect::<Vec<_>>(),
        ),
        Err(e) => {
            log::error!("❌ Failed to fetch like status for {}: {}", email, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/template/like/{template_id}",
    tag = "Likes",
    params(("template_id" = String, Path, description = "Template identifier")),
    responses(
        (status = 200, description = "Matching template counters", body = [TemplateLikesResponse])
    )
)]
pub async fn template_likes(
    store: web::Data<dyn LikeStore>,
    path: web::Path<String>,
) -> HttpResponse {
    let template_id = path.into_inner();

    match like_service::template_likes(store.get_ref(), &template_id).await {
        Ok(templates) => HttpResponse::Ok().json(
            templates
                .into_iter()
                .map(TemplateLikesResponse::from)
                .collect::<Vec<_>>(),
        ),
        Err(e) => {
            log::error!("❌ Failed to fetch likes for template {}: {}", template_id, e);
            e.error_response()
        }
    }
}
