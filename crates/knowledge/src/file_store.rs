//! File-based knowledge storage — one pretty-printed JSON document.
//!
//! Storage location: `~/.zalo/data/knowledge_base.json` unless configured
//! otherwise. The document is read once at startup and rewritten in full on
//! every mutation; there is no incremental persistence.
//!
//! A missing file is created empty on first load, so the file exists as soon
//! as the assistant has started once.

use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zalo_core::error::StorageError;
use zalo_core::knowledge::{KnowledgeDocument, KnowledgeStorage};
use zalo_core::storage::{read_document, write_document};

/// A knowledge store backed by a single JSON file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl KnowledgeStorage for JsonFileStore {
    fn name(&self) -> &str {
        "file"
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn load(&mut self) -> Result<KnowledgeDocument, StorageError> {
        match read_document::<KnowledgeDocument>(&self.path)? {
            Some(doc) => {
                debug!(
                    path = %self.path.display(),
                    topics = doc.topics.len(),
                    "Knowledge base loaded"
                );
                Ok(doc)
            }
            None => {
                let mut doc = KnowledgeDocument::new();
                self.save(&mut doc)?;
                info!(path = %self.path.display(), "Created empty knowledge base");
                Ok(doc)
            }
        }
    }

    fn save(&mut self, doc: &mut KnowledgeDocument) -> Result<(), StorageError> {
        doc.refresh_metadata();
        write_document(&self.path, doc)?;
        debug!(
            path = %self.path.display(),
            topics = doc.metadata.total_topics,
            "Knowledge base saved"
        );
        Ok(())
    }
}
