use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Extension, Router,
};
use hyper::Server;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::app::enrich_use_case::EnrichUseCase;
use crate::config::Config;
use crate::infra::registry_adapter::GleifRegistryAdapter;
use crate::observability::metrics;

/// Multipart field carrying the CSV upload
const FILE_FIELD: &str = "file";

pub struct AppState {
    pub use_case: EnrichUseCase,
    pub metrics_enabled: bool,
}

impl AppState {
    pub fn new(use_case: EnrichUseCase, metrics_enabled: bool) -> Self {
        Self {
            use_case,
            metrics_enabled,
        }
    }
}

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "Hello World" }))
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "lei-enricher",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    match metrics::render().filter(|_| state.metrics_enabled) {
        Some(body) => ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Accept a CSV upload and return the enriched records
async fn enrich(Extension(state): Extension<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let bytes = match read_upload(&mut multipart).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return detail(StatusCode::BAD_REQUEST, "no file uploaded"),
        Err(e) => return detail(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    match state.use_case.run(&bytes).await {
        Ok(outcome) => Json(outcome.into_response()).into_response(),
        Err(e) => {
            warn!(error = %e, "rejected upload");
            detail(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string())
        }
    }
}

/// Body of the `file` field, else of the first field.
async fn read_upload(multipart: &mut Multipart) -> Result<Option<Bytes>, MultipartError> {
    let mut first = None;
    while let Some(field) = multipart.next_field().await? {
        let is_file = field.name() == Some(FILE_FIELD);
        let bytes = field.bytes().await?;
        if is_file {
            return Ok(Some(bytes));
        }
        first.get_or_insert(bytes);
    }
    Ok(first)
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "detail": message }))).into_response()
}

/// Create the HTTP router with all routes
pub fn create_server(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .route("/enrich/", post(enrich))
        .route("/enrich", post(enrich))
        .layer(Extension(state))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Bind `server.bind_addr` and serve until Ctrl-C.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let metrics_enabled = config.server.metrics_enabled && metrics::init_metrics().is_some();

    let lookup = GleifRegistryAdapter::new(&config.registry).context("Failed to build registry client")?;
    let state = Arc::new(AppState::new(
        EnrichUseCase::with_default_enricher(Box::new(lookup)),
        metrics_enabled,
    ));

    let addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", config.server.bind_addr))?;

    info!(registry = %config.registry.base_url, "listening on http://{}", addr);
    Server::try_bind(&addr)
        .with_context(|| format!("Failed to bind {}", addr))?
        .serve(create_server(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
