// POST /verify: record a reviewer's verdict.
//
// Body: { "id": "...", "url": "...", "is_yuqing": true|false }
// `id` targets exactly one record and wins when both are given; `url`
// targets every record logged for that URL. `verdict` is accepted as an
// alias of `is_yuqing`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::store::models::Verdict;
use crate::store::UpdateOutcome;
use crate::web::{api_error, AppState};

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(alias = "verdict")]
    pub is_yuqing: bool,
}

enum Target {
    Id(String),
    Url(String),
}

pub async fn verify_event(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return api_error(rejection.status(), &rejection.body_text()),
    };

    let verdict = Verdict::from(request.is_yuqing);
    let id = request.id.filter(|s| !s.is_empty());
    let url = request.url.filter(|s| !s.is_empty());

    let target = match (id, url) {
        (Some(id), _) => Target::Id(id),
        (None, Some(url)) => Target::Url(url),
        (None, None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "success": false,
                    "error": "Either id or url is required",
                })),
            )
                .into_response();
        }
    };

    let store = state.verification.clone();
    let outcome = tokio::task::spawn_blocking(move || match target {
        Target::Id(id) => store.update_by_id(&id, verdict),
        Target::Url(url) => store.update_by_url(&url, verdict),
    })
    .await
    .unwrap_or_else(|e| UpdateOutcome {
        success: false,
        updated: 0,
        error: Some(format!("Verification task failed: {e}")),
    });

    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(outcome)).into_response()
}
