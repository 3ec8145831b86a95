// POST /analyze: classify one post sent by the browser extension.
//
// Body: { "post": { "items": [ { "note_card": {...} } ] }, "url": "..." }
// Only the first item is classified. Risk events are appended to the log
// before the response is sent; a failed append is reported as a 500 rather
// than dropped.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::ingest::note_card::NoteCard;
use crate::store::models::{ClassificationResult, LogRecord, Post, Verification};
use crate::web::{api_error, AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AnalyzeRequest {
    pub post: FeedPayload,
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FeedPayload {
    pub items: Vec<FeedItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FeedItem {
    pub note_card: NoteCard,
}

/// Classification plus the echoed post. `id` is set only when the post was
/// logged as a risk event.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub id: Option<String>,
    #[serde(flatten)]
    pub classification: ClassificationResult,
    #[serde(flatten)]
    pub post: Post,
    pub human_verified: Verification,
}

pub async fn analyze_post(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return api_error(rejection.status(), &rejection.body_text()),
    };

    let Some(item) = request.post.items.first() else {
        return api_error(StatusCode::BAD_REQUEST, "No items found");
    };

    let post = item.note_card.to_post(&request.url);
    let classification = state.classifier.classify(&post);

    let mut id = None;
    if classification.is_risk {
        let record = LogRecord::new(post.clone(), classification.clone());
        let record_id = record.id.clone();
        let log = state.log.clone();

        match tokio::task::spawn_blocking(move || log.append(&record)).await {
            Ok(Ok(())) => {
                info!(id = %record_id, url = %post.url, "Logged risk event");
                id = Some(record_id);
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Failed to append risk event");
                return api_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("Failed to log risk event: {e:#}"),
                );
            }
            Err(e) => {
                return api_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("Log task failed: {e}"),
                );
            }
        }
    }

    Json(AnalyzeResponse {
        id,
        classification,
        post,
        human_verified: Verification::Unset,
    })
    .into_response()
}
