// Web server: Axum-based JSON API for the browser extension.
//
// POST /analyze classifies a post and logs it if it is a risk event.
// GET /review lists events not yet rejected. POST /verify records a
// reviewer's verdict. The extension runs on a third-party origin, so CORS
// is open.

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::scoring::risk::RiskClassifier;
use crate::store::{EventLog, VerificationStore};

pub mod handlers;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<RiskClassifier>,
    pub log: Arc<EventLog>,
    pub verification: Arc<VerificationStore>,
}

impl AppState {
    /// State over the event log at `log.path()`.
    pub fn new(classifier: RiskClassifier, log: EventLog) -> Self {
        let verification = VerificationStore::new(log.path());
        Self {
            classifier: Arc::new(classifier),
            log: Arc::new(log),
            verification: Arc::new(verification),
        }
    }
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(state: AppState, bind: &str, port: u16) -> Result<()> {
    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    info!("Yuqing API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/analyze", post(handlers::analyze::analyze_post))
        .route("/review", get(handlers::review::list_review))
        .route("/verify", post(handlers::verify::verify_event))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness check: always returns 200 OK.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
}
