//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, OpenAiSolverAdapter, OpenAiTutorAdapter, SupabaseStorageAdapter},
    config::Config,
    error::ApiError,
    pipeline::{SubmissionPipeline, TutorRelay},
    web::{
        math_tutor_handler, rest::ApiDoc, solve_math_handler, state::AppState,
        upload_image_handler,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        Method,
    },
    routing::post,
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::{cors::{Any, CorsLayer}, services::ServeDir};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    let openai_client = Client::with_config(openai_config);

    let storage_adapter = Arc::new(SupabaseStorageAdapter::new(
        config.storage_url.clone(),
        config.storage_bucket.clone(),
        config.storage_service_key.clone(),
    ));
    let solver_adapter = Arc::new(OpenAiSolverAdapter::new(
        openai_client.clone(),
        config.solver_model.clone(),
    ));
    let tutor_adapter = Arc::new(OpenAiTutorAdapter::new(
        openai_client.clone(),
        config.tutor_model.clone(),
    ));

    // --- 4. Wire the Pipelines & Shared AppState ---
    let submission = SubmissionPipeline::new(
        storage_adapter.clone(),
        solver_adapter,
        db_adapter.clone(),
    );
    let tutor = TutorRelay::new(tutor_adapter);

    let app_state = Arc::new(AppState {
        config: config.clone(),
        storage: storage_adapter,
        submission,
        tutor,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let api_router = Router::new()
        .route("/api/images", post(upload_image_handler))
        .route("/api/solve-math", post(solve_math_handler))
        .route("/api/math-tutor", post(math_tutor_handler))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router and the static
    // frontend for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback_service(ServeDir::new(&config.static_dir));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
