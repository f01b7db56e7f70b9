//! Note store — a title → content map persisted as one JSON object.
//!
//! Storage location: `~/.zalo/data/notes.json` unless configured otherwise.
//! Adding a note under an existing title replaces it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use zalo_core::error::StorageError;
use zalo_core::storage::{read_document, write_document};

/// Title used when a note is saved without one.
pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NoteStore {
    path: PathBuf,
    notes: BTreeMap<String, Note>,
}

impl NoteStore {
    /// Load notes from `path`. Missing or unreadable files start empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let notes = match read_document::<BTreeMap<String, Note>>(&path) {
            Ok(Some(notes)) => notes,
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                warn!(error = %e, "Notes unavailable, starting empty");
                BTreeMap::new()
            }
        };
        debug!(path = %path.display(), count = notes.len(), "Note store loaded");
        Self { path, notes }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create or replace the note titled `title`.
    pub fn add(&mut self, title: &str, content: &str) -> Result<(), StorageError> {
        let now = Utc::now();
        let mut notes = self.notes.clone();
        notes.insert(
            title.trim().to_string(),
            Note {
                content: content.to_string(),
                created_at: now,
                updated_at: now,
            },
        );
        self.commit(notes)
    }

    pub fn get(&self, title: &str) -> Option<&Note> {
        self.notes.get(title.trim())
    }

    /// Titles, oldest note first.
    pub fn list(&self) -> Vec<&str> {
        let mut entries: Vec<(&String, &Note)> = self.notes.iter().collect();
        entries.sort_by_key(|(_, note)| note.created_at);
        entries.into_iter().map(|(title, _)| title.as_str()).collect()
    }

    /// Returns `false` if no such note exists.
    pub fn delete(&mut self, title: &str) -> Result<bool, StorageError> {
        let title = title.trim();
        if !self.notes.contains_key(title) {
            return Ok(false);
        }
        let mut notes = self.notes.clone();
        notes.remove(title);
        self.commit(notes)?;
        Ok(true)
    }

    /// Replace the content of an existing note. Returns `false` if absent.
    pub fn update(&mut self, title: &str, content: &str) -> Result<bool, StorageError> {
        let title = title.trim();
        let mut notes = self.notes.clone();
        let Some(note) = notes.get_mut(title) else {
            return Ok(false);
        };
        note.content = content.to_string();
        note.updated_at = Utc::now();
        self.commit(notes)?;
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    fn commit(&mut self, notes: BTreeMap<String, Note>) -> Result<(), StorageError> {
        write_document(&self.path, &notes)?;
        self.notes = notes;
        Ok(())
    }
}
