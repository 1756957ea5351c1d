use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::response::{ApiError, AppJson, JSend};
use crate::topic::Topic;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct TopicListResponse {
    pub topics: Vec<Topic>,
}

#[derive(Debug, Deserialize)]
pub struct AddTopicRequest {
    pub topic: String,
}

#[derive(Debug, Serialize)]
pub struct AddTopicResponse {
    pub topic: Topic,
    pub added: bool,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_topics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<TopicListResponse>>, ApiError> {
    let topics = state.service.load_topics().await?;
    Ok(JSend::success(TopicListResponse { topics }))
}

/// 201 when the topic is new, 200 when it already existed.
pub async fn add_topic(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<AddTopicRequest>,
) -> Result<(StatusCode, Json<JSend<AddTopicResponse>>), ApiError> {
    let (topic, added) = state.service.add_topic(&req.topic).await?;
    let code = if added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok(JSend::with_status(code, AddTopicResponse { topic, added }))
}
