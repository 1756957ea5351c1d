//! Topic names and their normalization.
//!
//! A topic can reach the service as instructor-typed text, as a JSON field, or
//! as a query parameter copied from a shared link (sometimes still
//! percent-encoded). Every path runs through [`Topic::parse`] so that all of
//! them resolve to the same registry entry and the same feedback table.

use std::fmt;

use percent_encoding::percent_decode_str;
use ring::digest;
use serde::Serialize;
use thiserror::Error;

/// Longest accepted topic, in characters, after normalization.
pub const MAX_TOPIC_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopicError {
    #[error("topic must not be empty")]
    Empty,
    #[error("topic must be at most {MAX_TOPIC_CHARS} characters")]
    TooLong,
    #[error("topic must not contain control characters")]
    ControlCharacter,
    #[error("topic must not contain percent-escapes after decoding")]
    AmbiguousEncoding,
}

/// A normalized topic name.
///
/// Invariant: `Topic::parse(t.as_str()) == Ok(t)` for every value produced by
/// `parse`, so normalizing twice never moves a topic to a different table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    /// Trim, percent-decode, trim again, then validate.
    pub fn parse(raw: &str) -> Result<Self, TopicError> {
        let name = decode(raw);

        if name.is_empty() {
            return Err(TopicError::Empty);
        }
        if name.chars().count() > MAX_TOPIC_CHARS {
            return Err(TopicError::TooLong);
        }
        if name.chars().any(char::is_control) {
            return Err(TopicError::ControlCharacter);
        }
        if decode(&name) != name {
            return Err(TopicError::AmbiguousEncoding);
        }

        Ok(Self(name))
    }

    /// Accept a name read back from persisted state. Only trims; stored names
    /// were normalized when they were written.
    pub fn from_stored(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            None
        } else {
            Some(Self(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase hex SHA-256 of the name, used as the on-disk key.
    pub fn storage_key(&self) -> String {
        let hash = digest::digest(&digest::SHA256, self.0.as_bytes());
        hash.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }
}

fn decode(raw: &str) -> String {
    let trimmed = raw.trim();
    match percent_decode_str(trimmed).decode_utf8() {
        Ok(decoded) => decoded.trim().to_string(),
        // Not valid UTF-8 once decoded; keep the literal text.
        Err(_) => trimmed.to_string(),
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        let topic = Topic::parse("  Lecture 1 \n").unwrap();
        assert_eq!(topic.as_str(), "Lecture 1");
    }

    #[test]
    fn test_parse_decodes_percent_encoding() {
        let encoded = Topic::parse("%ED%95%9C%EA%B8%80").unwrap();
        let plain = Topic::parse("한글").unwrap();
        assert_eq!(encoded, plain);
        assert_eq!(encoded.storage_key(), plain.storage_key());
    }

    #[test]
    fn test_parse_is_idempotent() {
        let once = Topic::parse(" Week%203 ").unwrap();
        let twice = Topic::parse(once.as_str()).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.as_str(), "Week 3");
    }

    #[test]
    fn test_parse_rejects_blank() {
        assert_eq!(Topic::parse("   "), Err(TopicError::Empty));
        assert_eq!(Topic::parse("%20%20"), Err(TopicError::Empty));
    }

    #[test]
    fn test_parse_rejects_control_characters() {
        assert_eq!(
            Topic::parse("line one\nline two"),
            Err(TopicError::ControlCharacter)
        );
        assert_eq!(Topic::parse("a%0Ab"), Err(TopicError::ControlCharacter));
    }

    #[test]
    fn test_parse_rejects_too_long() {
        let long = "x".repeat(MAX_TOPIC_CHARS + 1);
        assert_eq!(Topic::parse(&long), Err(TopicError::TooLong));
        assert!(Topic::parse(&"x".repeat(MAX_TOPIC_CHARS)).is_ok());
    }

    #[test]
    fn test_parse_rejects_double_encoded_escape() {
        // "%2541" decodes to "%41", which would decode again to "A".
        assert_eq!(Topic::parse("%2541"), Err(TopicError::AmbiguousEncoding));
    }

    #[test]
    fn test_parse_keeps_lone_percent() {
        let topic = Topic::parse("100% attendance").unwrap();
        assert_eq!(topic.as_str(), "100% attendance");
    }

    #[test]
    fn test_storage_key_is_path_safe() {
        let topic = Topic::parse("../../etc/passwd").unwrap();
        let key = topic.storage_key();
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_from_stored_skips_blank_lines() {
        assert!(Topic::from_stored("   ").is_none());
        assert_eq!(Topic::from_stored(" Lab ").unwrap().as_str(), "Lab");
    }
}
