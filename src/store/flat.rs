use async_trait::async_trait;
use bytes::Bytes;
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

use super::models::{FeedbackEntry, ResetStats};
use super::{table, FeedbackStore, StoreError};
use crate::topic::Topic;

const REGISTRY_FILE: &str = "topics.txt";
const REGISTRY_TMP_FILE: &str = "topics.txt.tmp";
const FEEDBACK_PREFIX: &str = "feedback_";
const FEEDBACK_SUFFIX: &str = ".csv";

/// Flat-file store: a newline-delimited topic registry plus one CSV table per
/// topic, all in a single directory.
///
/// Every mutation holds `writer`, so registry rewrites and appends never
/// interleave within this process.
pub struct FlatFileStore {
    base_path: PathBuf,
    writer: Mutex<()>,
}

impl FlatFileStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, std::io::Error> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self {
            base_path,
            writer: Mutex::new(()),
        })
    }

    fn registry_path(&self) -> PathBuf {
        self.base_path.join(REGISTRY_FILE)
    }

    /// Path of a topic's table. Named by hash so topic text never reaches the
    /// filesystem.
    pub fn feedback_path(&self, topic: &Topic) -> PathBuf {
        self.base_path.join(format!(
            "{FEEDBACK_PREFIX}{}{FEEDBACK_SUFFIX}",
            topic.storage_key()
        ))
    }

    async fn read_registry(&self) -> Result<Vec<Topic>, StoreError> {
        match tokio::fs::read_to_string(self.registry_path()).await {
            Ok(contents) => Ok(contents.lines().filter_map(Topic::from_stored).collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the registry via temp file + rename.
    async fn write_registry(&self, topics: &[Topic]) -> Result<(), StoreError> {
        let mut contents = String::new();
        for topic in topics {
            contents.push_str(topic.as_str());
            contents.push('\n');
        }

        let tmp = self.base_path.join(REGISTRY_TMP_FILE);
        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, self.registry_path()).await?;
        Ok(())
    }

    async fn read_table(&self, topic: &Topic) -> Result<Option<Vec<u8>>, StoreError> {
        match tokio::fs::read(self.feedback_path(topic)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

async fn ends_with_newline(file: &mut tokio::fs::File) -> Result<bool, std::io::Error> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1)).await?;
    file.read_exact(&mut last).await?;
    Ok(last[0] == b'\n')
}

fn is_feedback_table(name: &str) -> bool {
    name.starts_with(FEEDBACK_PREFIX) && name.ends_with(FEEDBACK_SUFFIX)
}

#[async_trait]
impl FeedbackStore for FlatFileStore {
    async fn list_topics(&self) -> Result<Vec<Topic>, StoreError> {
        self.read_registry().await
    }

    async fn add_topic(&self, topic: &Topic) -> Result<bool, StoreError> {
        let _guard = self.writer.lock().await;

        let mut topics = self.read_registry().await?;
        if topics.contains(topic) {
            return Ok(false);
        }
        topics.push(topic.clone());
        self.write_registry(&topics).await?;
        Ok(true)
    }

    async fn append_feedback(&self, topic: &Topic, entry: &FeedbackEntry) -> Result<(), StoreError> {
        let _guard = self.writer.lock().await;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(self.feedback_path(topic))
            .await?;

        // Header and row go out in one write so a reader never sees a
        // half-initialized table.
        let mut record = Vec::new();
        if file.metadata().await?.len() == 0 {
            record.extend(table::header()?);
        } else if !ends_with_newline(&mut file).await? {
            // A torn last line must not swallow the new row.
            record.push(b'\n');
        }
        record.extend(table::encode_row(entry)?);

        file.write_all(&record).await?;
        file.flush().await?;
        Ok(())
    }

    async fn read_feedback(&self, topic: &Topic) -> Result<Vec<FeedbackEntry>, StoreError> {
        let Some(bytes) = self.read_table(topic).await? else {
            return Ok(Vec::new());
        };

        let parsed = table::parse(&bytes);
        for e in &parsed.skipped {
            tracing::warn!(
                topic = %topic,
                line = table::error_line(e),
                error = %e,
                "Skipping malformed feedback row"
            );
        }
        Ok(parsed.entries)
    }

    async fn reset_all(&self) -> Result<ResetStats, StoreError> {
        let _guard = self.writer.lock().await;
        let mut stats = ResetStats {
            topics: self.read_registry().await?.len() as u64,
            tables: 0,
        };

        match tokio::fs::remove_file(self.registry_path()).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let mut dir = tokio::fs::read_dir(&self.base_path).await?;
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name();
            if name.to_str().is_some_and(is_feedback_table) {
                tokio::fs::remove_file(entry.path()).await?;
                stats.tables += 1;
            }
        }

        Ok(stats)
    }

    /// The persisted file, byte for byte.
    async fn export_csv(&self, topic: &Topic) -> Result<Bytes, StoreError> {
        match self.read_table(topic).await? {
            Some(bytes) => Ok(Bytes::from(bytes)),
            None => Ok(Bytes::from(table::header()?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_feedback_table() {
        assert!(is_feedback_table("feedback_abc.csv"));
        assert!(!is_feedback_table("topics.txt"));
        assert!(!is_feedback_table("feedback_abc.csv.bak"));
        assert!(!is_feedback_table("notes.csv"));
    }

    #[tokio::test]
    async fn test_malformed_table_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FlatFileStore::new(dir.path()).unwrap();
        let topic = Topic::parse("Lab").unwrap();

        std::fs::write(store.feedback_path(&topic), "not,a\nfeedback,table,at all\n").unwrap();

        assert!(store.read_feedback(&topic).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_torn_last_row_hides_nothing_else() {
        let dir = tempfile::tempdir().unwrap();
        let store = FlatFileStore::new(dir.path()).unwrap();
        let topic = Topic::parse("Lab").unwrap();

        for text in ["first", "second"] {
            store
                .append_feedback(&topic, &FeedbackEntry::now(text))
                .await
                .unwrap();
        }

        // Simulate an interrupted write: a partial row with no newline.
        let path = store.feedback_path(&topic);
        let mut bytes = std::fs::read(&path).unwrap();
        bytes.extend_from_slice(b"2025-03-04 09:1");
        std::fs::write(&path, &bytes).unwrap();

        store
            .append_feedback(&topic, &FeedbackEntry::now("third, after the tear"))
            .await
            .unwrap();

        let texts: Vec<String> = store
            .read_feedback(&topic)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.feedback)
            .collect();
        assert_eq!(texts, vec!["first", "second", "third, after the tear"]);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n2025-03-04 09:1\n"));
        assert!(raw.ends_with(",\"third, after the tear\"\n"));
    }

    #[tokio::test]
    async fn test_reset_leaves_unrelated_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FlatFileStore::new(dir.path()).unwrap();
        let topic = Topic::parse("Lab").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "keep me").unwrap();

        store.add_topic(&topic).await.unwrap();
        store
            .append_feedback(&topic, &FeedbackEntry::now("fine"))
            .await
            .unwrap();

        let stats = store.reset_all().await.unwrap();
        assert_eq!(stats, ResetStats { topics: 1, tables: 1 });
        assert!(dir.path().join("notes.txt").exists());
        assert!(!dir.path().join(REGISTRY_FILE).exists());
    }

    #[tokio::test]
    async fn test_registry_is_one_name_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let store = FlatFileStore::new(dir.path()).unwrap();

        for name in ["Lecture 1", "한글", "Lecture 1"] {
            store.add_topic(&Topic::parse(name).unwrap()).await.unwrap();
        }

        let contents = std::fs::read_to_string(dir.path().join(REGISTRY_FILE)).unwrap();
        assert_eq!(contents, "Lecture 1\n한글\n");
    }
}
