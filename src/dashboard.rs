//! Instructor dashboard: every topic with its student link, QR code, and
//! sentiment-tagged feedback sorted oldest first.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::qr;
use crate::sentiment::{Classifier, Sentiment};
use crate::service::{FeedbackService, ServiceError};
use crate::store::models::timestamp_format;
use crate::topic::Topic;

#[derive(Debug, Serialize)]
pub struct TopicSummary {
    pub topic: Topic,
    pub count: usize,
    pub student_url: String,
    /// `data:` URL of the QR PNG; `None` if the link could not be encoded.
    pub qr_png: Option<String>,
    pub entries: Vec<ClassifiedEntry>,
}

#[derive(Debug, Serialize)]
pub struct ClassifiedEntry {
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub feedback: String,
    pub sentiment: Sentiment,
}

pub struct DashboardBuilder<'a> {
    pub service: &'a FeedbackService,
    pub classifier: &'a Classifier,
    pub base_url: &'a str,
    pub qr_module_size: u32,
}

impl DashboardBuilder<'_> {
    pub async fn build(&self) -> Result<Vec<TopicSummary>, ServiceError> {
        let topics = self.service.load_topics().await?;
        let mut summaries = Vec::with_capacity(topics.len());
        for topic in topics {
            summaries.push(self.summarize(topic).await?);
        }
        Ok(summaries)
    }

    async fn summarize(&self, topic: Topic) -> Result<TopicSummary, ServiceError> {
        let mut entries = self.service.feedback_for(&topic).await?;
        // Stable: same-second entries keep insertion order.
        entries.sort_by_key(|e| e.timestamp);

        let student_url = qr::build_submission_url(self.base_url, &topic);
        let qr_png = match qr::render_png(&student_url, self.qr_module_size) {
            Ok(png) => Some(qr::png_data_url(&png)),
            Err(e) => {
                tracing::warn!(topic = %topic, error = %e, "Failed to render QR code");
                None
            }
        };

        let entries: Vec<ClassifiedEntry> = entries
            .into_iter()
            .map(|e| ClassifiedEntry {
                sentiment: self.classifier.classify(&e.feedback),
                timestamp: e.timestamp,
                feedback: e.feedback,
            })
            .collect();

        Ok(TopicSummary {
            count: entries.len(),
            topic,
            student_url,
            qr_png,
            entries,
        })
    }
}
