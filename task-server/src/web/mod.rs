use axum::Router;
use axum::response::Json;
use axum::routing::get;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::Config;
use crate::task::TaskState;
use crate::task::api::{self, MessageResponse, create_api_router};

#[derive(OpenApi)]
#[openapi(
    paths(
        api::get_tasks_handler,
        api::create_task_handler,
        api::update_task_handler,
        api::delete_task_handler,
        api::toggle_task_handler,
    ),
    tags((name = "Tasks", description = "Task list backed by a JSON file"))
)]
pub struct ApiDoc;

/// Builds the full application router for the given configuration.
pub fn create_router(config: &Config) -> Router {
    let task_state = Arc::new(TaskState::new(config.data_file.clone()));

    Router::new()
        .route("/", get(home_handler))
        .route("/health", get(health_check_handler))
        .route("/api-docs/openapi.json", get(openapi_handler))
        .merge(create_api_router(task_state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);
    tracing::info!("Storing tasks in {}", config.data_file.display());

    let app = create_router(&config);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tracing::instrument]
pub async fn home_handler() -> Json<MessageResponse> {
    Json(MessageResponse::new("Todo API is running!"))
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}

pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
