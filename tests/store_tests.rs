use chrono::NaiveDate;
use wordcrowd::store::table::{BOM, HEADER};
use wordcrowd::store::{
    FeedbackEntry, FeedbackStore, FlatFileStore, MemoryStore, RedbStore, ResetStats,
};
use wordcrowd::topic::Topic;

fn topic(name: &str) -> Topic {
    Topic::parse(name).unwrap()
}

fn entry_at(secs: u32, text: &str) -> FeedbackEntry {
    FeedbackEntry {
        timestamp: NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, secs)
            .unwrap(),
        feedback: text.to_string(),
    }
}

/// Every backend, each in its own directory.
fn backends(dir: &tempfile::TempDir) -> Vec<(&'static str, Box<dyn FeedbackStore>)> {
    let files: Box<dyn FeedbackStore> =
        Box::new(FlatFileStore::new(dir.path().join("files")).unwrap());
    let redb: Box<dyn FeedbackStore> =
        Box::new(RedbStore::open(dir.path().join("redb")).unwrap());
    let memory: Box<dyn FeedbackStore> = Box::new(MemoryStore::new());
    vec![("files", files), ("redb", redb), ("memory", memory)]
}

#[tokio::test]
async fn test_add_topic_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    for (name, store) in backends(&dir) {
        assert!(store.add_topic(&topic("Lecture 1")).await.unwrap(), "{name}");
        assert!(!store.add_topic(&topic("Lecture 1")).await.unwrap(), "{name}");
        assert!(store.add_topic(&topic("한글")).await.unwrap(), "{name}");

        assert_eq!(
            store.list_topics().await.unwrap(),
            vec![topic("Lecture 1"), topic("한글")],
            "{name}"
        );
    }
}

#[tokio::test]
async fn test_topics_keep_registration_order() {
    let dir = tempfile::tempdir().unwrap();
    for (name, store) in backends(&dir) {
        for t in ["zeta", "alpha", "Mid"] {
            store.add_topic(&topic(t)).await.unwrap();
        }
        assert_eq!(
            store.list_topics().await.unwrap(),
            vec![topic("zeta"), topic("alpha"), topic("Mid")],
            "{name}"
        );
    }
}

#[tokio::test]
async fn test_entries_come_back_in_insertion_order() {
    let dir = tempfile::tempdir().unwrap();
    for (name, store) in backends(&dir) {
        let lab = topic("Lab");
        let written = vec![
            entry_at(1, "first"),
            entry_at(1, "same second"),
            entry_at(7, "needs work, honestly"),
            entry_at(9, "\"quoted\"\nand multi-line"),
        ];
        for e in &written {
            store.append_feedback(&lab, e).await.unwrap();
        }

        let read = store.read_feedback(&lab).await.unwrap();
        assert_eq!(read, written, "{name}");
        assert!(
            read.windows(2).all(|w| w[0].timestamp <= w[1].timestamp),
            "{name}"
        );
    }
}

#[tokio::test]
async fn test_topics_do_not_share_tables() {
    let dir = tempfile::tempdir().unwrap();
    for (name, store) in backends(&dir) {
        store
            .append_feedback(&topic("A"), &entry_at(0, "for a"))
            .await
            .unwrap();
        store
            .append_feedback(&topic("B"), &entry_at(0, "for b"))
            .await
            .unwrap();

        let a = store.read_feedback(&topic("A")).await.unwrap();
        assert_eq!(a.len(), 1, "{name}");
        assert_eq!(a[0].feedback, "for a", "{name}");
    }
}

#[tokio::test]
async fn test_unknown_topic_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    for (name, store) in backends(&dir) {
        assert!(
            store.read_feedback(&topic("nobody")).await.unwrap().is_empty(),
            "{name}"
        );
        assert!(store.list_topics().await.unwrap().is_empty(), "{name}");
    }
}

#[tokio::test]
async fn test_reset_clears_topics_and_tables() {
    let dir = tempfile::tempdir().unwrap();
    for (name, store) in backends(&dir) {
        store.add_topic(&topic("A")).await.unwrap();
        store.add_topic(&topic("B")).await.unwrap();
        store
            .append_feedback(&topic("A"), &entry_at(0, "hello"))
            .await
            .unwrap();

        let stats = store.reset_all().await.unwrap();
        assert_eq!(stats, ResetStats { topics: 2, tables: 1 }, "{name}");
        assert!(store.list_topics().await.unwrap().is_empty(), "{name}");
        assert!(
            store.read_feedback(&topic("A")).await.unwrap().is_empty(),
            "{name}"
        );

        // A second reset finds nothing to remove.
        assert_eq!(store.reset_all().await.unwrap(), ResetStats::default(), "{name}");

        // The store stays usable after a reset.
        assert!(store.add_topic(&topic("A")).await.unwrap(), "{name}");
    }
}

#[tokio::test]
async fn test_export_has_bom_header_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    for (name, store) in backends(&dir) {
        let lab = topic("Lab");

        let empty = store.export_csv(&lab).await.unwrap();
        assert!(empty.starts_with(BOM), "{name}");
        assert_eq!(
            &empty[BOM.len()..],
            format!("{}\n", HEADER.join(",")).as_bytes(),
            "{name}"
        );

        store
            .append_feedback(&lab, &entry_at(5, "good, thanks"))
            .await
            .unwrap();
        let csv = store.export_csv(&lab).await.unwrap();
        let text = std::str::from_utf8(&csv[BOM.len()..]).unwrap();
        assert_eq!(
            text,
            "timestamp,feedback\n2024-03-01 09:00:05,\"good, thanks\"\n",
            "{name}"
        );
    }
}

#[tokio::test]
async fn test_persistent_backends_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let lab = topic("Lab");

    {
        let files = FlatFileStore::new(dir.path().join("files")).unwrap();
        files.add_topic(&lab).await.unwrap();
        files.append_feedback(&lab, &entry_at(0, "kept")).await.unwrap();

        let redb = RedbStore::open(dir.path().join("redb")).unwrap();
        redb.add_topic(&lab).await.unwrap();
        redb.append_feedback(&lab, &entry_at(0, "kept")).await.unwrap();
    }

    let files = FlatFileStore::new(dir.path().join("files")).unwrap();
    assert_eq!(files.list_topics().await.unwrap(), vec![lab.clone()]);
    assert_eq!(files.read_feedback(&lab).await.unwrap()[0].feedback, "kept");

    let redb = RedbStore::open(dir.path().join("redb")).unwrap();
    assert_eq!(redb.list_topics().await.unwrap(), vec![lab.clone()]);
    assert_eq!(redb.read_feedback(&lab).await.unwrap()[0].feedback, "kept");
}
