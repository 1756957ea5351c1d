use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::api::response::{ApiError, JSend};
use crate::store::ResetStats;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: serde_json::Value,
}

pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<HealthResponse>>, ApiError> {
    let topics = state.service.load_topics().await?;
    Ok(JSend::success(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: serde_json::json!({
            "backend": state.config.storage.backend.as_str(),
            "topics": topics.len(),
        }),
    }))
}

/// Delete every topic and all feedback. 403 unless `ALLOW_RESET` is on.
pub async fn reset(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<ResetStats>>, ApiError> {
    if !state.config.allow_reset {
        return Err(ApiError::forbidden("Reset is disabled on this server"));
    }
    let stats = state.service.reset_all().await?;
    Ok(JSend::success(stats))
}
