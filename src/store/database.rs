use async_trait::async_trait;
use redb::{Database as RedbDatabase, ReadableTable, ReadableTableMetadata};
use std::path::Path;
use thiserror::Error;

use super::models::{FeedbackEntry, ResetStats};
use super::tables::{FEEDBACK, TOPICS};
use super::{FeedbackStore, StoreError};
use crate::topic::Topic;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Commit error: {0}")]
    Commit(Box<redb::CommitError>),
    #[error("Database error: {0}")]
    RedbDatabase(Box<redb::DatabaseError>),
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] rmp_serde::decode::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),
    #[error("Storage error: {0}")]
    Storage(Box<redb::StorageError>),
    #[error("Table error: {0}")]
    Table(Box<redb::TableError>),
    #[error("Transaction error: {0}")]
    Transaction(Box<redb::TransactionError>),
}

impl From<redb::CommitError> for DatabaseError {
    fn from(e: redb::CommitError) -> Self {
        DatabaseError::Commit(Box::new(e))
    }
}

impl From<redb::DatabaseError> for DatabaseError {
    fn from(e: redb::DatabaseError) -> Self {
        DatabaseError::RedbDatabase(Box::new(e))
    }
}

impl From<redb::StorageError> for DatabaseError {
    fn from(e: redb::StorageError) -> Self {
        DatabaseError::Storage(Box::new(e))
    }
}

impl From<redb::TableError> for DatabaseError {
    fn from(e: redb::TableError) -> Self {
        DatabaseError::Table(Box::new(e))
    }
}

impl From<redb::TransactionError> for DatabaseError {
    fn from(e: redb::TransactionError) -> Self {
        DatabaseError::Transaction(Box::new(e))
    }
}

/// Embedded redb store. Each append is one write transaction, and redb runs
/// write transactions one at a time, so appends are atomic.
pub struct RedbStore {
    db: RedbDatabase,
}

impl RedbStore {
    /// Open or create the database in `data_dir`
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(data_dir.as_ref())?;
        let db = RedbDatabase::create(data_dir.as_ref().join("wordcrowd.redb"))?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(TOPICS)?;
            let _ = write_txn.open_table(FEEDBACK)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    fn topics(&self) -> Result<Vec<Topic>, DatabaseError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TOPICS)?;

        let mut ordered: Vec<(u64, String)> = Vec::new();
        for result in table.iter()? {
            let (name, seq) = result?;
            ordered.push((seq.value(), name.value().to_string()));
        }
        ordered.sort_by_key(|(seq, _)| *seq);

        Ok(ordered
            .iter()
            .filter_map(|(_, name)| Topic::from_stored(name))
            .collect())
    }

    fn insert_topic(&self, topic: &Topic) -> Result<bool, DatabaseError> {
        let write_txn = self.db.begin_write()?;
        let added = {
            let mut table = write_txn.open_table(TOPICS)?;
            if table.get(topic.as_str())?.is_some() {
                false
            } else {
                let mut next = 0;
                for result in table.iter()? {
                    let (_, seq) = result?;
                    next = next.max(seq.value() + 1);
                }
                table.insert(topic.as_str(), next)?;
                true
            }
        };
        write_txn.commit()?;
        Ok(added)
    }

    fn push_entry(&self, topic: &Topic, entry: &FeedbackEntry) -> Result<(), DatabaseError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(FEEDBACK)?;
            let mut entries: Vec<FeedbackEntry> = match table.get(topic.as_str())? {
                Some(data) => rmp_serde::from_slice(data.value())?,
                None => Vec::new(),
            };
            entries.push(entry.clone());

            let data = rmp_serde::to_vec_named(&entries)?;
            table.insert(topic.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn entries(&self, topic: &Topic) -> Result<Vec<FeedbackEntry>, DatabaseError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(FEEDBACK)?;

        match table.get(topic.as_str())? {
            Some(data) => match rmp_serde::from_slice(data.value()) {
                Ok(entries) => Ok(entries),
                Err(e) => {
                    tracing::warn!(topic = %topic, error = %e, "Malformed feedback record, treating as empty");
                    Ok(Vec::new())
                }
            },
            None => Ok(Vec::new()),
        }
    }

    fn purge_all(&self) -> Result<ResetStats, DatabaseError> {
        let write_txn = self.db.begin_write()?;
        let stats = {
            let mut topics = write_txn.open_table(TOPICS)?;
            let mut feedback = write_txn.open_table(FEEDBACK)?;
            let stats = ResetStats {
                topics: topics.len()?,
                tables: feedback.len()?,
            };
            topics.retain(|_, _| false)?;
            feedback.retain(|_, _| false)?;
            stats
        };
        write_txn.commit()?;
        Ok(stats)
    }
}

#[async_trait]
impl FeedbackStore for RedbStore {
    async fn list_topics(&self) -> Result<Vec<Topic>, StoreError> {
        Ok(self.topics()?)
    }

    async fn add_topic(&self, topic: &Topic) -> Result<bool, StoreError> {
        Ok(self.insert_topic(topic)?)
    }

    async fn append_feedback(&self, topic: &Topic, entry: &FeedbackEntry) -> Result<(), StoreError> {
        Ok(self.push_entry(topic, entry)?)
    }

    async fn read_feedback(&self, topic: &Topic) -> Result<Vec<FeedbackEntry>, StoreError> {
        Ok(self.entries(topic)?)
    }

    async fn reset_all(&self) -> Result<ResetStats, StoreError> {
        Ok(self.purge_all()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purge_all_counts_and_empties_both_tables() {
        let dir = tempfile::tempdir().unwrap();
        let lab = Topic::parse("Lab").unwrap();
        let quiz = Topic::parse("Quiz").unwrap();

        {
            let store = RedbStore::open(dir.path()).unwrap();
            store.insert_topic(&lab).unwrap();
            store.insert_topic(&quiz).unwrap();
            store.push_entry(&lab, &FeedbackEntry::now("fine")).unwrap();

            let stats = store.purge_all().unwrap();
            assert_eq!(stats, ResetStats { topics: 2, tables: 1 });
        }

        // The purge is committed, not just visible inside the transaction.
        let store = RedbStore::open(dir.path()).unwrap();
        assert!(store.topics().unwrap().is_empty());
        assert!(store.entries(&lab).unwrap().is_empty());
        assert_eq!(store.purge_all().unwrap(), ResetStats::default());

        // Sequence numbering restarts cleanly after a purge.
        assert!(store.insert_topic(&quiz).unwrap());
        assert!(store.insert_topic(&lab).unwrap());
        assert_eq!(store.topics().unwrap(), vec![quiz, lab]);
    }
}
