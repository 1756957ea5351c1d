//! Topic and feedback operations on top of a [`FeedbackStore`].
//!
//! This is the only place raw user input is turned into a [`Topic`], so the
//! same normalization applies on every read and write path.

use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::store::{FeedbackEntry, FeedbackStore, ResetStats, StoreError};
use crate::topic::{Topic, TopicError};

pub const DEFAULT_MAX_FEEDBACK_CHARS: usize = 50;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidTopic(#[from] TopicError),
    #[error("feedback must not be empty")]
    EmptyFeedback,
    #[error("feedback must be at most {max} characters (got {actual})")]
    FeedbackTooLong { max: usize, actual: usize },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// True for errors caused by the caller's input.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, ServiceError::Store(_))
    }
}

pub struct FeedbackService {
    store: Arc<dyn FeedbackStore>,
    max_feedback_chars: usize,
}

impl FeedbackService {
    pub fn new(store: Arc<dyn FeedbackStore>, max_feedback_chars: usize) -> Self {
        Self {
            store,
            max_feedback_chars,
        }
    }

    pub fn max_feedback_chars(&self) -> usize {
        self.max_feedback_chars
    }

    pub async fn load_topics(&self) -> Result<Vec<Topic>, ServiceError> {
        Ok(self.store.list_topics().await?)
    }

    /// Register a topic. Returns the normalized topic and whether it was new.
    pub async fn add_topic(&self, raw: &str) -> Result<(Topic, bool), ServiceError> {
        let topic = Topic::parse(raw)?;
        let added = self.store.add_topic(&topic).await?;
        if added {
            info!(topic = %topic, "Added topic");
        }
        Ok((topic, added))
    }

    /// Validate and store one submission, registering the topic if unseen.
    pub async fn save_feedback(
        &self,
        raw_topic: &str,
        text: &str,
    ) -> Result<(Topic, FeedbackEntry), ServiceError> {
        let topic = Topic::parse(raw_topic)?;
        let text = self.validate_feedback(text)?;

        if self.store.add_topic(&topic).await? {
            info!(topic = %topic, "Registered topic from submission");
        }

        let entry = FeedbackEntry::now(text);
        self.store.append_feedback(&topic, &entry).await?;

        debug!(topic = %topic, chars = entry.feedback.chars().count(), "Saved feedback");
        Ok((topic, entry))
    }

    /// Entries for a topic in insertion order, with the normalized topic.
    pub async fn load_feedback(
        &self,
        raw_topic: &str,
    ) -> Result<(Topic, Vec<FeedbackEntry>), ServiceError> {
        let topic = Topic::parse(raw_topic)?;
        let entries = self.feedback_for(&topic).await?;
        Ok((topic, entries))
    }

    pub async fn feedback_for(&self, topic: &Topic) -> Result<Vec<FeedbackEntry>, ServiceError> {
        Ok(self.store.read_feedback(topic).await?)
    }

    pub async fn export_csv(&self, raw_topic: &str) -> Result<(Topic, Bytes), ServiceError> {
        let topic = Topic::parse(raw_topic)?;
        let csv = self.store.export_csv(&topic).await?;
        Ok((topic, csv))
    }

    /// Delete every topic and feedback table. Immediate, no undo.
    pub async fn reset_all(&self) -> Result<ResetStats, ServiceError> {
        let stats = self.store.reset_all().await?;
        warn!(
            topics = stats.topics,
            tables = stats.tables,
            "Reset all feedback data"
        );
        Ok(stats)
    }

    fn validate_feedback<'a>(&self, text: &'a str) -> Result<&'a str, ServiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ServiceError::EmptyFeedback);
        }
        let actual = text.chars().count();
        if actual > self.max_feedback_chars {
            return Err(ServiceError::FeedbackTooLong {
                max: self.max_feedback_chars,
                actual,
            });
        }
        Ok(text)
    }
}
