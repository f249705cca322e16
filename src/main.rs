mod api;
mod config;
mod database;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::database::{LikeStore, RegistrationStore};
use crate::services::{FirebaseAuth, IdentityProvider};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ {}", e);
            std::process::exit(1);
        }
    };

    log::info!("🚀 Starting Greenforms Service...");
    log::info!("📊 Database: {}", config.database_name);

    // Initialize MongoDB connection
    let db = match database::MongoDB::new(&config.database_url, &config.database_name).await {
        Ok(db) => db,
        Err(e) => {
            log::error!("❌ Failed to connect to MongoDB: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("✅ MongoDB connected successfully");

    let identity = match FirebaseAuth::new(
        config.service_account.clone(),
        config.identity_toolkit_url.as_str(),
    ) {
        Ok(identity) => identity,
        Err(e) => {
            log::error!("❌ Failed to initialize identity provider: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("🔐 Identity provider ready for project {}", config.service_account.project_id);

    let db = Arc::new(db);
    let like_store: web::Data<dyn LikeStore> = web::Data::from(db.clone() as Arc<dyn LikeStore>);
    let registration_store: web::Data<dyn RegistrationStore> =
        web::Data::from(db as Arc<dyn RegistrationStore>);
    let identity: web::Data<dyn IdentityProvider> =
        web::Data::from(Arc::new(identity) as Arc<dyn IdentityProvider>);

    let host = config.host.clone();
    let port = config.port;

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI document at: http://{}:{}/api-docs/openapi.json", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(like_store.clone())
            .app_data(registration_store.clone())
            .app_data(identity.clone())
            .app_data(api::json_config())
            .wrap(cors)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi),
            )
            .configure(api::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
