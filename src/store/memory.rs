use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::models::{FeedbackEntry, ResetStats};
use super::{FeedbackStore, StoreError};
use crate::topic::Topic;

/// In-memory store for tests and throwaway sessions. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    topics: Vec<Topic>,
    feedback: HashMap<Topic, Vec<FeedbackEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeedbackStore for MemoryStore {
    async fn list_topics(&self) -> Result<Vec<Topic>, StoreError> {
        Ok(self.inner.lock().await.topics.clone())
    }

    async fn add_topic(&self, topic: &Topic) -> Result<bool, StoreError> {
        let mut state = self.inner.lock().await;
        if state.topics.contains(topic) {
            return Ok(false);
        }
        state.topics.push(topic.clone());
        Ok(true)
    }

    async fn append_feedback(&self, topic: &Topic, entry: &FeedbackEntry) -> Result<(), StoreError> {
        let mut state = self.inner.lock().await;
        state
            .feedback
            .entry(topic.clone())
            .or_default()
            .push(entry.clone());
        Ok(())
    }

    async fn read_feedback(&self, topic: &Topic) -> Result<Vec<FeedbackEntry>, StoreError> {
        let state = self.inner.lock().await;
        Ok(state.feedback.get(topic).cloned().unwrap_or_default())
    }

    async fn reset_all(&self) -> Result<ResetStats, StoreError> {
        let mut state = self.inner.lock().await;
        let stats = ResetStats {
            topics: state.topics.len() as u64,
            tables: state.feedback.len() as u64,
        };
        state.topics.clear();
        state.feedback.clear();
        Ok(stats)
    }
}
