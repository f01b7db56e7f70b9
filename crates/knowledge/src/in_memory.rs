//! In-memory storage — useful for testing and ephemeral sessions.

use std::path::Path;
use zalo_core::error::StorageError;
use zalo_core::knowledge::{KnowledgeDocument, KnowledgeStorage};

/// Keeps the last saved document in memory. Nothing survives the process.
#[derive(Default)]
pub struct InMemoryStore {
    document: KnowledgeDocument,
    saves: usize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing document, as if it had been loaded from disk.
    pub fn with_document(document: KnowledgeDocument) -> Self {
        Self { document, saves: 0 }
    }

    /// How many times `save` has been called.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl KnowledgeStorage for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    fn path(&self) -> Option<&Path> {
        None
    }

    fn load(&mut self) -> Result<KnowledgeDocument, StorageError> {
        Ok(self.document.clone())
    }

    fn save(&mut self, doc: &mut KnowledgeDocument) -> Result<(), StorageError> {
        doc.refresh_metadata();
        self.document = doc.clone();
        self.saves += 1;
        Ok(())
    }
}
