//! wordcrowd - classroom feedback collection
//!
//! Instructors create topics and share a QR-coded link per topic; students
//! submit short feedback through it; the instructor dashboard shows every
//! topic's feedback, tagged by sentiment, with CSV export. Features:
//! - Flat-file (topic list + per-topic CSV) or embedded redb persistence
//! - Lexicon and polarity sentiment classification
//! - QR codes for student submission links
//! - JSON API with JSend envelopes behind two small pages

pub mod api;
pub mod config;
pub mod dashboard;
pub mod qr;
pub mod sentiment;
pub mod service;
pub mod store;
#[cfg(test)]
pub mod testutil;
pub mod topic;

use axum::http::HeaderMap;
use std::sync::Arc;

use config::Config;
use sentiment::Classifier;
use service::FeedbackService;
use store::FeedbackStore;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub classifier: Classifier,
    pub service: FeedbackService,
    /// Stylesheet body, empty when none is configured or it failed to load
    pub stylesheet: String,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn FeedbackStore>, stylesheet: String) -> Self {
        let classifier = config.sentiment.classifier();
        let service = FeedbackService::new(store, config.feedback.max_chars);
        Self {
            config,
            classifier,
            service,
            stylesheet,
        }
    }

    /// Base URL for student links: configured, else discovered from the
    /// request, else the bind address.
    pub fn base_url(&self, headers: &HeaderMap) -> String {
        self.config
            .server
            .public_base_url
            .clone()
            .or_else(|| qr::discover_base_url(headers))
            .unwrap_or_else(|| format!("http://{}", self.config.server.bind_address))
    }
}
