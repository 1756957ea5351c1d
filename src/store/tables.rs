use redb::TableDefinition;

/// Topic registry: topic name -> registration sequence (defines list order)
pub const TOPICS: TableDefinition<&str, u64> = TableDefinition::new("topics");

/// Feedback tables: topic name -> msgpack Vec<FeedbackEntry>, insertion order
pub const FEEDBACK: TableDefinition<&str, &[u8]> = TableDefinition::new("feedback");
