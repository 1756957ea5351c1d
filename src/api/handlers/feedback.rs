use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::TopicParams;
use crate::api::response::{ApiError, AppJson, AppQuery, JSend};
use crate::qr::encode_component;
use crate::store::FeedbackEntry;
use crate::topic::Topic;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct FeedbackListResponse {
    pub topic: Topic,
    pub count: usize,
    pub entries: Vec<FeedbackEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitFeedbackRequest {
    pub topic: String,
    pub feedback: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitFeedbackResponse {
    pub topic: Topic,
    pub entry: FeedbackEntry,
}

// ============================================================================
// Handlers
// ============================================================================

/// Entries in insertion order.
pub async fn list_feedback(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<TopicParams>,
) -> Result<Json<JSend<FeedbackListResponse>>, ApiError> {
    let (topic, entries) = state.service.load_feedback(&params.topic).await?;
    Ok(JSend::success(FeedbackListResponse {
        topic,
        count: entries.len(),
        entries,
    }))
}

pub async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SubmitFeedbackRequest>,
) -> Result<(StatusCode, Json<JSend<SubmitFeedbackResponse>>), ApiError> {
    let (topic, entry) = state
        .service
        .save_feedback(&req.topic, &req.feedback)
        .await?;
    Ok(JSend::with_status(
        StatusCode::CREATED,
        SubmitFeedbackResponse { topic, entry },
    ))
}

/// Download a topic's table as CSV.
pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<TopicParams>,
) -> Result<Response, ApiError> {
    let (topic, csv) = state.service.export_csv(&params.topic).await?;

    let mut response = (StatusCode::OK, csv).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );

    // ASCII fallback name plus the RFC 5987 form carrying the real topic.
    let disposition = format!(
        "attachment; filename=\"feedback.csv\"; filename*=UTF-8''feedback_{}.csv",
        encode_component(topic.as_str())
    );
    if let Ok(value) = disposition.parse() {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    Ok(response)
}
