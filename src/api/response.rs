use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::service::ServiceError;

// ============================================================================
// JSend envelopes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JSendStatus {
    Error,
    Fail,
    Success,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JSend<T: Serialize> {
    pub data: T,
    pub status: JSendStatus,
}

impl<T: Serialize> JSend<T> {
    pub fn success(data: T) -> Json<JSend<T>> {
        Json(JSend {
            data,
            status: JSendStatus::Success,
        })
    }

    /// Success envelope with a non-200 status (e.g. 201 Created).
    pub fn with_status(code: StatusCode, data: T) -> (StatusCode, Json<JSend<T>>) {
        (code, Self::success(data))
    }
}

/// Client error body: `{"status": "fail", "data": {"message": ...}}`
#[derive(Debug, Serialize, Deserialize)]
pub struct JSendFail {
    pub data: FailData,
    pub status: JSendStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FailData {
    pub message: String,
}

/// Server error body: `{"status": "error", "message": ...}`
#[derive(Debug, Serialize, Deserialize)]
pub struct JSendError {
    pub message: String,
    pub status: JSendStatus,
}

// ============================================================================
// Handler error type
// ============================================================================

/// `Fail` renders as a JSend fail (4xx), `Error` as a JSend error (5xx).
#[derive(Debug)]
pub enum ApiError {
    Fail(StatusCode, String),
    Error(StatusCode, String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Fail(code, message) => {
                let body = JSendFail {
                    data: FailData { message },
                    status: JSendStatus::Fail,
                };
                (code, Json(body)).into_response()
            }
            ApiError::Error(code, message) => {
                let body = JSendError {
                    message,
                    status: JSendStatus::Error,
                };
                (code, Json(body)).into_response()
            }
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Fail(StatusCode::BAD_REQUEST, message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Fail(StatusCode::FORBIDDEN, message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Error(StatusCode::INTERNAL_SERVER_ERROR, message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Fail(code, _) | ApiError::Error(code, _) => *code,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        if e.is_invalid_input() {
            ApiError::bad_request(e.to_string())
        } else {
            tracing::error!(error = %e, "Storage failure");
            ApiError::internal("Failed to access feedback storage")
        }
    }
}

// ============================================================================
// Extractors that reject with JSend bodies
// ============================================================================

/// `axum::Json` with JSend rejections.
pub struct AppJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, ApiError> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => {
                let message = match rejection {
                    JsonRejection::JsonDataError(err) => {
                        format!("Invalid request body: {}", err.body_text())
                    }
                    JsonRejection::JsonSyntaxError(_) => "Malformed JSON in request body".into(),
                    JsonRejection::MissingJsonContentType(_) => {
                        "Missing Content-Type: application/json header".into()
                    }
                    _ => "Failed to read request body".into(),
                };
                Err(ApiError::bad_request(message))
            }
        }
    }
}

/// `axum::extract::Query` backed by `serde_qs`, with JSend rejections.
pub struct AppQuery<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, ApiError> {
        let query = parts.uri.query().unwrap_or_default();
        serde_qs::from_str(query)
            .map(AppQuery)
            .map_err(|e| ApiError::bad_request(format!("Invalid query parameter: {e}")))
    }
}
