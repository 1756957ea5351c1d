use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use super::TopicParams;
use crate::api::response::{ApiError, AppQuery, JSend};
use crate::dashboard::{DashboardBuilder, TopicSummary};
use crate::qr;
use crate::service::ServiceError;
use crate::topic::Topic;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub refresh_interval_secs: u64,
    pub max_feedback_chars: usize,
    pub topics: Vec<TopicSummary>,
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<JSend<DashboardResponse>>, ApiError> {
    let base_url = state.base_url(&headers);
    let topics = DashboardBuilder {
        service: &state.service,
        classifier: &state.classifier,
        base_url: &base_url,
        qr_module_size: state.config.feedback.qr_module_size,
    }
    .build()
    .await?;

    Ok(JSend::success(DashboardResponse {
        refresh_interval_secs: state.config.feedback.refresh_interval_secs,
        max_feedback_chars: state.service.max_feedback_chars(),
        topics,
    }))
}

/// QR code PNG for a topic's student link.
pub async fn topic_qr(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    AppQuery(params): AppQuery<TopicParams>,
) -> Result<Response, ApiError> {
    let topic = Topic::parse(&params.topic).map_err(ServiceError::from)?;
    let url = qr::build_submission_url(&state.base_url(&headers), &topic);
    let png = qr::render_png(&url, state.config.feedback.qr_module_size).map_err(|e| {
        tracing::error!(topic = %topic, error = %e, "Failed to render QR code");
        ApiError::internal("Failed to render QR code")
    })?;

    let mut response = (StatusCode::OK, png).into_response();
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
    Ok(response)
}
