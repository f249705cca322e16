use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Greenforms Service API",
        version = "1.0.0",
        description = "Template likes and registered users directory.\n\n**Features:**\n- Like/unlike templates with a per-template like counter\n- Registered users directory with roles\n- Account deletion through the identity provider"
    ),
    paths(
        // Health
        crate::api::health::index,
        crate::api::health::health_check,

        // Likes
        crate::api::likes::like_template,
        crate::api::likes::unlike_template,
        crate::api::likes::like_status,
        crate::api::likes::template_likes,

        // Registered users
        crate::api::registered_users::create_registered_user,
        crate::api::registered_users::list_registered_users,
        crate::api::registered_users::get_registered_user,
        crate::api::registered_users::set_registered_user_role,
        crate::api::registered_users::delete_registered_user,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::models::LikeRequest,
            crate::models::LikerUserResponse,
            crate::models::TemplateLikesResponse,
            crate::models::SetRoleRequest,
            crate::models::InsertResult,
            crate::models::UpdateResult,
        )
    ),
    tags(
        (name = "Health", description = "Greeting and health check endpoints."),
        (name = "Likes", description = "Like/unlike templates and read like state and counters."),
        (name = "Registered Users", description = "Registered users directory. Deletion also removes the identity provider account."),
    )
)]
pub struct ApiDoc;
