//! Knowledge record - the unit of pipeline output

use crate::category::{Category, Importance};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for a knowledge record based on UUIDv7
///
/// UUIDv7 keeps identifiers time-sortable, so records produced by one run
/// order by creation without a separate sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(u128);

impl RecordId {
    /// Generate a new UUIDv7-based RecordId
    ///
    /// # Examples
    ///
    /// ```
    /// use lorekeeper_domain::RecordId;
    ///
    /// let id = RecordId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a RecordId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a RecordId from its hyphenated string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid record id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Milliseconds since the Unix epoch encoded in the identifier
    pub fn timestamp_millis(&self) -> u64 {
        (self.0 >> 80) as u64
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// A piece of extracted organisational knowledge
///
/// Records are immutable once handed out. Merging and deduplication build
/// new lists and never edit a record in place.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeRecord {
    /// Unique identifier
    pub id: RecordId,

    /// Short human-readable label
    pub title: String,

    /// Body text
    pub content: String,

    /// Classification
    pub category: Category,

    /// Short search terms, duplicates allowed
    pub keywords: Vec<String>,

    /// Relative importance
    pub importance: Importance,

    /// Where the record came from (document label, optionally with chunk suffix)
    pub source: String,

    /// Creation time (unix seconds)
    pub created_at: u64,

    /// Last update time (unix seconds); equal to `created_at` on creation
    pub updated_at: u64,
}

impl KnowledgeRecord {
    /// Create a new record stamped with a fresh id and the current time
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        category: Category,
        keywords: Vec<String>,
        importance: Importance,
        source: impl Into<String>,
    ) -> Self {
        let now = unix_now();
        Self {
            id: RecordId::new(),
            title: title.into(),
            content: content.into(),
            category,
            keywords,
            importance,
            source: source.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Current time as unix seconds (0 if the clock is before the epoch)
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
