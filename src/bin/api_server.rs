// src/bin/api_server.rs

use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use employee_records::infra::{config, db};
use employee_records::transport;
use employee_records::{
    AttachmentStore, AuthService, EmployeeService, FieldService, SchemaRegistry,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // --- Database Initialization ---
    println!("> Connecting to database and provisioning tables...");
    let pool = db::connect().await?;
    println!("> Database ready.");

    // --- Service Initialization ---
    let registry = SchemaRegistry::new(pool.clone());
    let attachments = AttachmentStore::new(config::media_root(), config::max_upload_bytes());
    let jwt_secret = config::jwt_secret();

    let app_state = transport::http::AppState {
        employees: Arc::new(EmployeeService::new(
            pool.clone(),
            registry.clone(),
            attachments,
        )),
        fields: Arc::new(FieldService::new(pool.clone(), registry.clone())),
        auth: Arc::new(AuthService::new(
            pool.clone(),
            jwt_secret.clone(),
            config::access_token_ttl_secs(),
        )),
        schema_lock: Arc::new(RwLock::new(())),
        jwt_secret: Arc::new(jwt_secret),
    };

    let version = registry.schema_version().await.unwrap_or(0);
    println!(
        "> Services initialized (media root: {}, schema version: {}).",
        config::media_root(),
        version
    );

    // --- API Server Initialization ---
    println!("> Starting API server...");
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()),
        )
        .layer(axum::extract::DefaultBodyLimit::max(
            config::max_upload_bytes() + 64 * 1024,
        ))
        .layer(cors);

    let addr = config::bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    println!("> API server listening on http://{}", addr);
    println!("> Swagger UI available at /swagger-ui");
    println!("> Press Ctrl+C to shut down");

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\n> Shutdown signal received (Ctrl+C). Bye.");
        }
    }

    Ok(())
}
