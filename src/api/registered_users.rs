use actix_web::{web, HttpResponse, ResponseError};

use crate::{
    database::RegistrationStore,
    models::{InsertResult, RegisteredUser, RegisteredUserResponse, SetRoleRequest, UpdateResult},
    services::{
        registration_service::{self, CreateOutcome},
        IdentityProvider,
    },
    utils::AppError,
};

#[utoipa::path(
    post,
    path = "/registereduser",
    tag = "Registered Users",
    responses(
        (status = 200, description = "Insert result, or `{message: 'user already exists'}` when the email is taken", body = InsertResult),
        (status = 400, description = "Missing email")
    )
)]
pub async fn create_registered_user(
    store: web::Data<dyn RegistrationStore>,
    body: web::Json<serde_json::Value>,
) -> HttpResponse {
    let user = match RegisteredUser::from_json(body.into_inner()) {
        Ok(user) => user,
        Err(e) => return AppError::InvalidRequest(e).error_response(),
    };

    log::info!("📝 POST /registereduser - email: {}", user.email);

    match registration_service::create_user(store.get_ref(), user).await {
        Ok(CreateOutcome::Created(result)) => HttpResponse::Ok().json(result),
        Ok(CreateOutcome::AlreadyExists) => HttpResponse::Ok().json(serde_json::json!({
            "message": "user already exists"
        })),
        Err(e) => {
            log::error!("❌ Failed to register user: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/registereduser",
    tag = "Registered Users",
    responses(
        (status = 200, description = "All registered users")
    )
)]
pub async fn list_registered_users(store: web::Data<dyn RegistrationStore>) -> HttpResponse {
    match registration_service::list_users(store.get_ref()).await {
        Ok(users) => HttpResponse::Ok().json(
            users
                .into_iter()
                .map(RegisteredUserResponse::from)
                .collect::<Vec<_>>(),
        ),
        Err(e) => {
            log::error!("❌ Failed to list registered users: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/registereduser/{key}",
    tag = "Registered Users",
    params(("key" = String, Path, description = "User email for GET and DELETE; store id (ObjectId hex) for PUT")),
    responses(
        (status = 200, description = "The user document, or null")
    )
)]
pub async fn get_registered_user(
    store: web::Data<dyn RegistrationStore>,
    path: web::Path<String>,
) -> HttpResponse {
    let email = path.into_inner();

    match registration_service::get_user_by_email(store.get_ref(), &email).await {
        Ok(user) => HttpResponse::Ok().json(user.map(RegisteredUserResponse::from)),
        Err(e) => {
            log::error!("❌ Failed to fetch registered user {}: {}", email, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    put,
    path = "/registereduser/{key}",
    tag = "Registered Users",
    params(("key" = String, Path, description = "User email for GET and DELETE; store id (ObjectId hex) for PUT")),
    request_body = SetRoleRequest,
    responses(
        (status = 200, description = "Update result", body = UpdateResult),
        (status = 400, description = "Invalid id")
    )
)]
pub async fn set_registered_user_role(
    store: web::Data<dyn RegistrationStore>,
    path: web::Path<String>,
    body: web::Json<SetRoleRequest>,
) -> HttpResponse {
    let id = path.into_inner();

    log::info!("🛡️ PUT /registereduser/{} - role: {}", id, body.value);

    match registration_service::set_role(store.get_ref(), &id, &body.value).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => {
            log::warn!("❌ Failed to set role on {}: {}", id, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/registereduser/{key}",
    tag = "Registered Users",
    params(("key" = String, Path, description = "User email for GET and DELETE; store id (ObjectId hex) for PUT")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Identity provider or database error")
    )
)]
pub async fn delete_registered_user(
    store: web::Data<dyn RegistrationStore>,
    identity: web::Data<dyn IdentityProvider>,
    path: web::Path<String>,
) -> HttpResponse {
    let email = path.into_inner();

    log::info!("🗑️ DELETE /registereduser/{}", email);

    match registration_service::delete_user(store.get_ref(), identity.get_ref(), &email).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "message": "User deleted successfully"
        })),
        Err(AppError::NotFound(_)) => HttpResponse::NotFound().json(serde_json::json!({
            "message": "User not found"
        })),
        Err(e) => {
            log::error!("❌ Error deleting user {}: {}", email, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "message": "Internal server error"
            }))
        }
    }
}
