mod database;
mod flat;
mod memory;
pub mod models;
pub mod table;
mod tables;

pub use database::{DatabaseError, RedbStore};
pub use flat::FlatFileStore;
pub use memory::MemoryStore;
pub use models::{FeedbackEntry, ResetStats};

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::topic::Topic;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Persistence for the topic registry and per-topic feedback tables.
///
/// Topics passed in are already normalized; implementations compare them by
/// exact string match. A topic with no table reads as empty.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Registered topics in registration order.
    async fn list_topics(&self) -> Result<Vec<Topic>, StoreError>;

    /// Register `topic`. Returns false if it was already present.
    async fn add_topic(&self, topic: &Topic) -> Result<bool, StoreError>;

    async fn append_feedback(&self, topic: &Topic, entry: &FeedbackEntry) -> Result<(), StoreError>;

    /// Entries in insertion order.
    async fn read_feedback(&self, topic: &Topic) -> Result<Vec<FeedbackEntry>, StoreError>;

    /// Drop the registry and every feedback table.
    async fn reset_all(&self) -> Result<ResetStats, StoreError>;

    /// The topic's table as CSV (BOM, header, rows).
    async fn export_csv(&self, topic: &Topic) -> Result<Bytes, StoreError> {
        let entries = self.read_feedback(topic).await?;
        Ok(Bytes::from(table::render(&entries)?))
    }
}
