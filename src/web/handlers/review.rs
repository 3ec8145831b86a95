// GET /review: risk events that have not been rejected.
//
// Pending and confirmed events are both returned; callers tell them apart
// by `human_verified` (null vs true).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::web::{api_error, AppState};

pub async fn list_review(State(state): State<AppState>) -> Response {
    let store = state.verification.clone();
    match tokio::task::spawn_blocking(move || store.list_pending_or_confirmed()).await {
        Ok(Ok(records)) => Json(records).into_response(),
        Ok(Err(e)) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("Failed to read event log: {e:#}"),
        ),
        Err(e) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("Review task failed: {e}"),
        ),
    }
}
