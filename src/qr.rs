//! Student submission links and their QR codes.

use std::io::Cursor;

use axum::http::{header, HeaderMap};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{ImageFormat, Luma};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use qrcode::QrCode;
use thiserror::Error;

use crate::topic::Topic;

/// Characters escaped in a query-string component (RFC 3986 unreserved are kept).
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub const DEFAULT_MODULE_SIZE: u32 = 8;

#[derive(Debug, Error)]
pub enum QrError {
    #[error("QR encoding failed: {0}")]
    Encode(String),
    #[error("PNG encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Percent-encode `s` for use inside a URL component.
pub fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// `{base}/?mode=student&topic={topic}`, topic percent-encoded.
pub fn build_submission_url(base_url: &str, topic: &Topic) -> String {
    format!(
        "{}/?mode=student&topic={}",
        base_url.trim_end_matches('/'),
        encode_component(topic.as_str())
    )
}

/// Base URL as seen by the client, from proxy headers or `Host`.
pub fn discover_base_url(headers: &HeaderMap) -> Option<String> {
    let value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            // Proxies may append a chain; the first hop is the client-facing one.
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let host = value("x-forwarded-host").or_else(|| value(header::HOST.as_str()))?;
    let scheme = value("x-forwarded-proto").unwrap_or("http");
    Some(format!("{scheme}://{host}"))
}

/// Render `url` as a PNG QR code with a quiet zone. `module_size` is the
/// pixel width of one module.
pub fn render_png(url: &str, module_size: u32) -> Result<Vec<u8>, QrError> {
    let code = QrCode::new(url.as_bytes()).map_err(|e| QrError::Encode(e.to_string()))?;
    let image = code
        .render::<Luma<u8>>()
        .module_dimensions(module_size, module_size)
        .quiet_zone(true)
        .build();

    let mut png = Cursor::new(Vec::new());
    image.write_to(&mut png, ImageFormat::Png)?;
    Ok(png.into_inner())
}

pub fn png_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}
