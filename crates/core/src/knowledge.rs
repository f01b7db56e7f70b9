//! Knowledge domain — learned topics and the responses filed under them.
//!
//! The assistant remembers free-form facts as *topics* (normalized keys)
//! mapped to one or more *response records*. The whole set lives in a single
//! [`KnowledgeDocument`] that is loaded at startup and flushed on every
//! mutation through a [`KnowledgeStorage`] implementation.

use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A stored reply plus the conversational context it was learned in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    /// The reply text
    pub text: String,

    /// Topic that must have been discussed just before for this reply to be
    /// preferred. Serialized as `null` when absent.
    #[serde(default)]
    pub context: Option<String>,

    /// Seconds since the Unix epoch when the record was created
    #[serde(default)]
    pub timestamp: f64,
}

impl ResponseRecord {
    /// Create a record stamped with the current wall-clock time.
    pub fn new(text: impl Into<String>, context: Option<String>) -> Self {
        Self {
            text: text.into(),
            context,
            timestamp: unix_timestamp(),
        }
    }

    /// Same reply in the same context, regardless of when it was learned.
    pub fn same_content(&self, other: &ResponseRecord) -> bool {
        self.text == other.text && self.context == other.context
    }
}

/// Bookkeeping refreshed on every save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub last_updated: f64,

    #[serde(default)]
    pub total_topics: usize,
}

/// The persisted knowledge base.
///
/// Topics are kept in a `BTreeMap` so the file layout and every iteration
/// over topics is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    #[serde(default)]
    pub topics: BTreeMap<String, Vec<ResponseRecord>>,

    #[serde(default)]
    pub metadata: Metadata,
}

impl KnowledgeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute `total_topics` and stamp `last_updated` with the wall clock.
    pub fn refresh_metadata(&mut self) {
        self.metadata = Metadata {
            last_updated: unix_timestamp(),
            total_topics: self.topics.len(),
        };
    }

    /// Union `topics` into this document, skipping exact duplicates.
    ///
    /// Keys are normalized on the way in; empty keys and empty record lists
    /// are ignored so no empty topic is ever created.
    pub fn merge_topics(&mut self, topics: BTreeMap<String, Vec<ResponseRecord>>) {
        for (topic, records) in topics {
            let topic = normalize_topic(&topic);
            if topic.is_empty() || records.is_empty() {
                continue;
            }
            let existing = self.topics.entry(topic).or_default();
            for record in records {
                if !existing.contains(&record) {
                    existing.push(record);
                }
            }
        }
    }

    /// Re-key every topic in canonical form and drop topics without records.
    ///
    /// Topics whose keys collapse to the same normalized form are merged.
    pub fn normalize(&mut self) {
        let topics = std::mem::take(&mut self.topics);
        self.merge_topics(topics);
    }
}

/// Lowercase and trim — the canonical form of every topic key.
pub fn normalize_topic(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Current wall-clock time as fractional seconds since the Unix epoch.
pub fn unix_timestamp() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Durable home of a [`KnowledgeDocument`].
///
/// Implementations: JSON file, in-memory (for testing).
pub trait KnowledgeStorage: Send {
    /// The backend name (e.g., "file", "in_memory").
    fn name(&self) -> &str;

    /// Backing file, if the storage has one. Used to derive backup paths.
    fn path(&self) -> Option<&Path>;

    /// Load the document. A missing document is created empty.
    fn load(&mut self) -> Result<KnowledgeDocument, StorageError>;

    /// Refresh the document's metadata and persist it.
    fn save(&mut self, doc: &mut KnowledgeDocument) -> Result<(), StorageError>;
}
