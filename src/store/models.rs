use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};

/// One student submission. Field names double as the CSV header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub feedback: String,
}

impl FeedbackEntry {
    /// Stamp `feedback` with the server's local wall-clock time, truncated to
    /// whole seconds. Instructors read these times as classroom time.
    pub fn now(feedback: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now().naive_local().trunc_subsecs(0),
            feedback: feedback.into(),
        }
    }
}

/// Counts from a full reset
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResetStats {
    pub topics: u64,
    pub tables: u64,
}

/// `YYYY-MM-DD HH:MM:SS`, the format written to every feedback table.
pub mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(raw.trim(), FORMAT).map_err(serde::de::Error::custom)
    }
}
