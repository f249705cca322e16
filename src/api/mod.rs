pub mod health;
pub mod likes;
pub mod registered_users;
pub mod swagger;

use actix_web::{error::InternalError, web, HttpResponse};

/// Registers every route of the service
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health::index))
        .route("/health", web::get().to(health::health_check))
        // Likes
        .route("/api/like", web::post().to(likes::like_template))
        .route("/api/unlike", web::post().to(likes::unlike_template))
        .route("/api/like-status/{email}", web::get().to(likes::like_status))
        .route("/template/like/{template_id}", web::get().to(likes::template_likes))
        // Registered users: one resource per pattern so the method decides the handler
        .service(
            web::resource("/registereduser")
                .route(web::post().to(registered_users::create_registered_user))
                .route(web::get().to(registered_users::list_registered_users)),
        )
        .service(
            web::resource("/registereduser/{key}")
                .route(web::get().to(registered_users::get_registered_user))
                .route(web::put().to(registered_users::set_registered_user_role))
                .route(web::delete().to(registered_users::delete_registered_user)),
        );
}

/// Malformed JSON bodies answer 400 with the same `{message}` shape as the handlers
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        log::warn!("❌ Rejected request body: {}", message);
        InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(serde_json::json!({ "message": message })),
        )
        .into()
    })
}
