//! Page routing. `GET /` picks a view from its query parameters:
//! `reset=true` wipes all data, `mode=student&topic=...` serves the
//! submission form, anything else serves the instructor dashboard.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::response::{ApiError, AppQuery};
use crate::topic::Topic;
use crate::AppState;

const STUDENT_HTML: &str = include_str!("../assets/student.html");
const INSTRUCTOR_HTML: &str = include_str!("../assets/instructor.html");

#[derive(Debug, Default, Deserialize)]
pub struct ViewParams {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub reset: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum View {
    Reset,
    Student(Topic),
    /// Student mode with a missing or unusable topic
    BadLink(String),
    Instructor,
}

impl ViewParams {
    pub fn view(&self) -> View {
        let reset = self
            .reset
            .as_deref()
            .is_some_and(|r| r.trim().eq_ignore_ascii_case("true"));
        if reset {
            return View::Reset;
        }

        match self.mode.as_deref().map(str::trim) {
            Some(mode) if mode.eq_ignore_ascii_case("student") => match self.topic.as_deref() {
                Some(raw) => match Topic::parse(raw) {
                    Ok(topic) => View::Student(topic),
                    Err(e) => View::BadLink(e.to_string()),
                },
                None => View::BadLink("this link has no topic".to_string()),
            },
            _ => View::Instructor,
        }
    }
}

pub async fn index(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<ViewParams>,
) -> Result<Response, ApiError> {
    match params.view() {
        View::Reset => {
            if !state.config.allow_reset {
                return Ok(notice_page(
                    StatusCode::FORBIDDEN,
                    "Reset disabled",
                    "Reset is disabled on this server.",
                ));
            }
            state.service.reset_all().await?;
            Ok(notice_page(
                StatusCode::OK,
                "Reset complete",
                "All topics and feedback have been deleted.",
            ))
        }
        View::Student(topic) => {
            let page = STUDENT_HTML
                .replace("{{topic}}", &escape_html(topic.as_str()))
                .replace(
                    "{{max_chars}}",
                    &state.service.max_feedback_chars().to_string(),
                );
            Ok(Html(page).into_response())
        }
        View::BadLink(reason) => Ok(notice_page(
            StatusCode::BAD_REQUEST,
            "Invalid link",
            &format!("This feedback link cannot be used: {reason}."),
        )),
        View::Instructor => Ok(Html(INSTRUCTOR_HTML).into_response()),
    }
}

pub async fn stylesheet(State(state): State<Arc<AppState>>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        state.stylesheet.clone(),
    )
        .into_response()
}

/// Read the optional stylesheet. A missing file is logged and yields an
/// empty stylesheet; pages still render.
pub fn load_stylesheet(path: Option<&str>) -> String {
    let Some(path) = path else {
        return String::new();
    };
    match std::fs::read_to_string(path) {
        Ok(css) => css,
        Err(e) => {
            tracing::warn!(path, error = %e, "Stylesheet not available, serving pages without it");
            String::new()
        }
    }
}

fn notice_page(code: StatusCode, title: &str, message: &str) -> Response {
    let body = format!(
        "<!doctype html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title}</title>\
         <link rel=\"stylesheet\" href=\"/assets/style.css\"></head>\n\
         <body><main class=\"notice\"><h1>{title}</h1><p>{message}</p></main></body>\n</html>\n",
        title = escape_html(title),
        message = escape_html(message),
    );
    (code, Html(body)).into_response()
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
