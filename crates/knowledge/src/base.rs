//! The knowledge base — learn, recall, forget, export, import.
//!
//! Composes a [`KnowledgeStorage`] backend, the [`TopicMatcher`], the
//! [`ResponseSelector`], and a [`ConversationContext`]. The knowledge base
//! exclusively owns the in-memory document and the context.
//!
//! Every mutation is applied to a copy of the document, the copy is
//! persisted, and only a successful save swaps it in. A failed save leaves
//! memory and disk agreeing with each other.

use crate::matcher::{DEFAULT_SIMILARITY_THRESHOLD, TopicMatcher};
use crate::selector::ResponseSelector;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zalo_core::context::ConversationContext;
use zalo_core::error::{KnowledgeError, StorageError};
use zalo_core::knowledge::{
    KnowledgeDocument, KnowledgeStorage, ResponseRecord, normalize_topic,
};
use zalo_core::storage::{read_document, write_document};

/// Result of a successful `learn`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Learned {
    pub topic: String,
    /// `false` when an identical record was already stored
    pub added: bool,
}

impl fmt::Display for Learned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Learned about {}!", self.topic)
    }
}

/// Result of a `forget`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForgetOutcome {
    /// The whole topic was removed
    Everything(String),
    /// Only records with the given text were removed
    Specific(String),
    /// The topic did not exist
    NothingToForget,
}

impl fmt::Display for ForgetOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Everything(topic) => write!(f, "Forgot everything about {topic}"),
            Self::Specific(topic) => {
                write!(f, "Forgot specific information about {topic}")
            }
            Self::NothingToForget => write!(f, "Nothing to forget"),
        }
    }
}

pub struct KnowledgeBase {
    storage: Box<dyn KnowledgeStorage>,
    document: KnowledgeDocument,
    matcher: TopicMatcher,
    selector: ResponseSelector,
    context: ConversationContext,
    rng: StdRng,
}

impl KnowledgeBase {
    /// Load the document from `storage`.
    ///
    /// An unreadable or corrupt document is logged and replaced by an empty
    /// one; the assistant stays usable with an empty knowledge base.
    /// Topic keys are normalized and empty topics dropped on the way in.
    pub fn open(mut storage: Box<dyn KnowledgeStorage>) -> Self {
        let document = match storage.load() {
            Ok(mut doc) => {
                let loaded = doc.topics.len();
                doc.normalize();
                if doc.topics.len() != loaded {
                    debug!(loaded, kept = doc.topics.len(), "Normalized loaded topics");
                }
                doc
            }
            Err(e) => {
                warn!(
                    backend = storage.name(),
                    error = %e,
                    "Knowledge base unavailable, starting empty"
                );
                KnowledgeDocument::new()
            }
        };

        Self {
            storage,
            document,
            matcher: TopicMatcher::new(DEFAULT_SIMILARITY_THRESHOLD),
            selector: ResponseSelector::default(),
            context: ConversationContext::new(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Minimum similarity ratio for fuzzy topic matches.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.matcher = TopicMatcher::new(threshold);
        self
    }

    pub fn with_context_sensitivity(mut self, enabled: bool) -> Self {
        self.selector = ResponseSelector::new(enabled);
        self
    }

    /// Bound the lookup history. Resets the context.
    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.context = match limit {
            Some(limit) => ConversationContext::with_history_limit(limit),
            None => ConversationContext::new(),
        };
        self
    }

    /// Deterministic response selection, for tests and reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Answer `input` from learned knowledge.
    ///
    /// On success the conversation context moves to the resolved topic.
    pub fn get_response(&mut self, input: &str) -> Option<String> {
        let topic = self.matcher.resolve(input, &self.document.topics)?;
        let records = self.document.topics.get(&topic)?;
        let record = self
            .selector
            .select(records, &self.context, &mut self.rng)?
            .clone();

        debug!(input, topic = %topic, "Knowledge lookup resolved");
        self.context.update(&topic, &record, input);
        Some(record.text)
    }

    /// File `text` under `topic`, optionally tied to a preceding topic.
    ///
    /// Learning the same text in the same context twice stores one record.
    pub fn learn(
        &mut self,
        topic: &str,
        text: &str,
        context: Option<&str>,
    ) -> Result<Learned, KnowledgeError> {
        let topic = normalize_topic(topic);
        if topic.is_empty() {
            return Err(KnowledgeError::InvalidInput("topic must not be empty".into()));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(KnowledgeError::InvalidInput(format!(
                "nothing to learn about {topic}"
            )));
        }
        let context = context.map(normalize_topic).filter(|c| !c.is_empty());

        let record = ResponseRecord::new(text, context);
        let mut doc = self.document.clone();
        let records = doc.topics.entry(topic.clone()).or_default();
        let added = !records.iter().any(|r| r.same_content(&record));
        if added {
            records.push(record);
        }

        self.commit(doc)?;
        debug!(topic = %topic, added, "Learned");
        Ok(Learned { topic, added })
    }

    /// Forget a whole topic, or only the records whose text is `response`.
    ///
    /// A topic left without records is removed.
    pub fn forget(
        &mut self,
        topic: &str,
        response: Option<&str>,
    ) -> Result<ForgetOutcome, KnowledgeError> {
        let topic = normalize_topic(topic);
        if !self.document.topics.contains_key(&topic) {
            return Ok(ForgetOutcome::NothingToForget);
        }

        let mut doc = self.document.clone();
        let outcome = match response.map(str::trim).filter(|r| !r.is_empty()) {
            None => {
                doc.topics.remove(&topic);
                ForgetOutcome::Everything(topic.clone())
            }
            Some(text) => {
                if let Some(records) = doc.topics.get_mut(&topic) {
                    records.retain(|r| r.text != text);
                    if records.is_empty() {
                        doc.topics.remove(&topic);
                    }
                }
                ForgetOutcome::Specific(topic.clone())
            }
        };

        self.commit(doc)?;
        debug!(topic = %topic, outcome = %outcome, "Forgot");
        Ok(outcome)
    }

    /// Write the current document verbatim to `path`.
    ///
    /// Defaults to the storage file with a `.backup` suffix.
    pub fn export(&self, path: Option<&Path>) -> Result<PathBuf, KnowledgeError> {
        let target = match path {
            Some(p) => p.to_path_buf(),
            None => self.default_backup_path().ok_or_else(|| {
                KnowledgeError::InvalidInput(format!(
                    "{} storage has no file; give an export path",
                    self.storage.name()
                ))
            })?,
        };

        write_document(&target, &self.document)?;
        info!(
            path = %target.display(),
            topics = self.document.topics.len(),
            "Knowledge exported"
        );
        Ok(target)
    }

    /// Merge another knowledge file into this one.
    ///
    /// Returns the number of topics in the imported file, not the number
    /// of topics that were new.
    pub fn import(&mut self, path: &Path) -> Result<usize, KnowledgeError> {
        let imported: KnowledgeDocument = read_document(path)?
            .ok_or_else(|| StorageError::unavailable(path, "file not found"))?;
        let count = imported.topics.len();

        let mut doc = self.document.clone();
        doc.merge_topics(imported.topics);
        self.commit(doc)?;

        info!(path = %path.display(), topics = count, "Knowledge imported");
        Ok(count)
    }

    /// Known topics in ascending order.
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.document.topics.keys().map(String::as_str)
    }

    /// Records filed under `topic` (normalized before lookup).
    pub fn records(&self, topic: &str) -> Option<&[ResponseRecord]> {
        self.document
            .topics
            .get(&normalize_topic(topic))
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.document.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.topics.is_empty()
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    pub fn document(&self) -> &KnowledgeDocument {
        &self.document
    }

    pub fn threshold(&self) -> f64 {
        self.matcher.threshold()
    }

    pub fn storage_name(&self) -> &str {
        self.storage.name()
    }

    pub fn storage_path(&self) -> Option<&Path> {
        self.storage.path()
    }

    fn default_backup_path(&self) -> Option<PathBuf> {
        self.storage.path().map(|p| {
            let mut name = p.as_os_str().to_owned();
            name.push(".backup");
            PathBuf::from(name)
        })
    }

    /// Persist `doc`, then make it current.
    fn commit(&mut self, mut doc: KnowledgeDocument) -> Result<(), StorageError> {
        if let Err(e) = self.storage.save(&mut doc) {
            warn!(backend = self.storage.name(), error = %e, "Failed to save knowledge base");
            return Err(e);
        }
        self.document = doc;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_store::JsonFileStore;
    use crate::in_memory::InMemoryStore;

    fn empty_kb() -> KnowledgeBase {
        KnowledgeBase::open(Box::new(InMemoryStore::new())).with_seed(42)
    }

    fn summarize(kb: &KnowledgeBase) -> Vec<(String, Vec<(String, Option<String>)>)> {
        kb.document()
            .topics
            .iter()
            .map(|(topic, records)| {
                let records = records
                    .iter()
                    .map(|r| (r.text.clone(), r.context.clone()))
                    .collect();
                (topic.clone(), records)
            })
            .collect()
    }

    /// Storage whose saves always fail.
    struct ReadOnlyStore;

    impl KnowledgeStorage for ReadOnlyStore {
        fn name(&self) -> &str {
            "read_only"
        }
        fn path(&self) -> Option<&Path> {
            None
        }
        fn load(&mut self) -> Result<KnowledgeDocument, StorageError> {
            Ok(KnowledgeDocument::new())
        }
        fn save(&mut self, _doc: &mut KnowledgeDocument) -> Result<(), StorageError> {
            Err(StorageError::unavailable("/read-only", "permission denied"))
        }
    }

    #[test]
    fn learn_then_recall() {
        let mut kb = empty_kb();
        assert_eq!(kb.get_response("hello"), None);

        let learned = kb.learn("hello", "Hi there!", None).unwrap();
        assert_eq!(learned.to_string(), "Learned about hello!");

        assert_eq!(kb.get_response("hello").as_deref(), Some("Hi there!"));
    }

    #[test]
    fn learn_normalizes_topic() {
        let mut kb = empty_kb();
        kb.learn("  Rust ", "Fast and safe", None).unwrap();
        assert_eq!(kb.topics().collect::<Vec<_>>(), vec!["rust"]);
        assert_eq!(kb.get_response("RUST").as_deref(), Some("Fast and safe"));
    }

    #[test]
    fn learn_is_idempotent() {
        let mut kb = empty_kb();
        assert!(kb.learn("hello", "Hi", None).unwrap().added);
        assert!(!kb.learn("hello", "Hi", None).unwrap().added);
        assert_eq!(kb.records("hello").unwrap().len(), 1);

        // a different context is a different record
        assert!(kb.learn("hello", "Hi", Some("morning")).unwrap().added);
        assert_eq!(kb.records("hello").unwrap().len(), 2);
    }

    #[test]
    fn learn_rejects_empty_topic_and_text() {
        let mut kb = empty_kb();
        assert!(matches!(
            kb.learn("   ", "text", None),
            Err(KnowledgeError::InvalidInput(_))
        ));
        assert!(matches!(
            kb.learn("topic", "  ", None),
            Err(KnowledgeError::InvalidInput(_))
        ));
        assert!(kb.is_empty());
    }

    #[test]
    fn fuzzy_lookup_resolves_typo() {
        let mut kb = empty_kb().with_threshold(0.6);
        kb.learn("python", "Python is great", None).unwrap();
        kb.learn("python", "Python has batteries included", None).unwrap();

        let answer = kb.get_response("pithon").unwrap();
        assert!(answer == "Python is great" || answer == "Python has batteries included");
        assert_eq!(kb.context().last_topic.as_deref(), Some("python"));
        assert_eq!(kb.context().history[0].input, "pithon");
    }

    #[test]
    fn context_steers_next_answer() {
        let mut kb = empty_kb();
        kb.learn("weather", "It is sunny", None).unwrap();
        kb.learn("plans", "Stay inside", None).unwrap();
        kb.learn("plans", "Go to the beach", Some("weather")).unwrap();

        for _ in 0..10 {
            kb.get_response("weather").unwrap();
            assert_eq!(kb.get_response("plans").as_deref(), Some("Go to the beach"));
        }
    }

    #[test]
    fn failed_lookup_leaves_context_untouched() {
        let mut kb = empty_kb();
        kb.learn("python", "Python is great", None).unwrap();
        assert_eq!(kb.get_response("zzzzzz"), None);
        assert!(kb.context().last_topic.is_none());
        assert!(kb.context().history.is_empty());
    }

    #[test]
    fn forget_whole_topic() {
        let mut kb = empty_kb();
        kb.learn("python", "A", None).unwrap();
        kb.learn("python", "B", None).unwrap();

        let outcome = kb.forget("python", None).unwrap();
        assert_eq!(outcome.to_string(), "Forgot everything about python");
        assert!(kb.records("python").is_none());
    }

    #[test]
    fn forget_one_record_keeps_the_rest() {
        let mut kb = empty_kb();
        kb.learn("python", "Python is great", None).unwrap();
        kb.learn("python", "Python is readable", None).unwrap();

        let outcome = kb.forget("python", Some("Python is great")).unwrap();
        assert_eq!(outcome, ForgetOutcome::Specific("python".into()));
        assert_eq!(kb.get_response("python").as_deref(), Some("Python is readable"));
    }

    #[test]
    fn forgetting_last_record_removes_topic() {
        let mut kb = empty_kb();
        kb.learn("python", "Python is great", None).unwrap();
        kb.forget("python", Some("Python is great")).unwrap();
        assert!(kb.is_empty());
    }

    #[test]
    fn forget_unknown_topic() {
        let mut kb = empty_kb();
        assert_eq!(kb.forget("nothing", None).unwrap().to_string(), "Nothing to forget");
    }

    #[test]
    fn failed_save_leaves_memory_unchanged() {
        let mut kb = KnowledgeBase::open(Box::new(ReadOnlyStore));
        let err = kb.learn("hello", "Hi", None).unwrap_err();
        assert!(matches!(err, KnowledgeError::Storage(_)));
        assert!(kb.is_empty());
        assert_eq!(kb.get_response("hello"), None);
    }

    #[test]
    fn corrupt_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("knowledge_base.json");
        std::fs::write(&path, "not json at all").unwrap();

        let mut kb = KnowledgeBase::open(Box::new(JsonFileStore::new(&path)));
        assert!(kb.is_empty());

        // still usable, and the next save replaces the corrupt file
        kb.learn("hello", "Hi", None).unwrap();
        let reopened = KnowledgeBase::open(Box::new(JsonFileStore::new(&path)));
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn loaded_file_with_raw_keys_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("knowledge_base.json");
        std::fs::write(
            &path,
            r#"{"topics": {
                "Python": [{"text": "Python is great", "context": null, "timestamp": 1.0}],
                "ghost": []
            }}"#,
        )
        .unwrap();

        let mut kb = KnowledgeBase::open(Box::new(JsonFileStore::new(&path))).with_seed(7);
        assert_eq!(kb.topics().collect::<Vec<_>>(), vec!["python"]);
        assert_eq!(kb.len(), 1);

        // learning under the typed-in casing extends the existing topic
        kb.learn("Python", "Python has batteries included", None).unwrap();
        assert_eq!(kb.len(), 1);
        assert_eq!(kb.records("python").unwrap().len(), 2);

        assert_eq!(
            kb.forget("Python", None).unwrap(),
            ForgetOutcome::Everything("python".into())
        );
        assert!(kb.is_empty());

        let reopened = KnowledgeBase::open(Box::new(JsonFileStore::new(&path)));
        assert!(reopened.is_empty());
        assert_eq!(reopened.document().metadata.total_topics, 0);
    }

    #[test]
    fn every_backend_is_normalized_on_open() {
        let mut doc = KnowledgeDocument::new();
        doc.topics
            .insert(" Rust ".into(), vec![ResponseRecord::new("Fast and safe", None)]);
        doc.topics.insert("empty".into(), Vec::new());

        let mut kb = KnowledgeBase::open(Box::new(InMemoryStore::with_document(doc)));
        assert_eq!(kb.topics().collect::<Vec<_>>(), vec!["rust"]);
        assert_eq!(kb.get_response("rust").as_deref(), Some("Fast and safe"));
    }

    #[test]
    fn learned_knowledge_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("knowledge_base.json");

        let mut kb = KnowledgeBase::open(Box::new(JsonFileStore::new(&path)));
        kb.learn("hello", "Hi there!", None).unwrap();
        drop(kb);

        let mut kb = KnowledgeBase::open(Box::new(JsonFileStore::new(&path))).with_seed(1);
        assert_eq!(kb.get_response("hello").as_deref(), Some("Hi there!"));
        assert_eq!(kb.document().metadata.total_topics, 1);
    }

    #[test]
    fn export_defaults_to_backup_next_to_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("knowledge_base.json");
        let mut kb = KnowledgeBase::open(Box::new(JsonFileStore::new(&path)));
        kb.learn("hello", "Hi", None).unwrap();

        let exported = kb.export(None).unwrap();
        assert_eq!(exported, dir.path().join("knowledge_base.json.backup"));
        assert_eq!(
            std::fs::read_to_string(&exported).unwrap(),
            std::fs::read_to_string(&path).unwrap()
        );
    }

    #[test]
    fn export_without_path_needs_a_file_backend() {
        let kb = empty_kb();
        assert!(matches!(kb.export(None), Err(KnowledgeError::InvalidInput(_))));
    }

    #[test]
    fn export_import_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let backup = dir.path().join("backup.json");

        let mut source = empty_kb();
        source.learn("python", "Python is great", None).unwrap();
        source.learn("python", "Python is readable", Some("code")).unwrap();
        source.learn("rust", "Rust is fast", None).unwrap();
        source.export(Some(&backup)).unwrap();

        let mut target = empty_kb();
        assert_eq!(target.import(&backup).unwrap(), 2);
        assert_eq!(summarize(&target), summarize(&source));

        // importing again adds nothing but still reports the file's topics
        assert_eq!(target.import(&backup).unwrap(), 2);
        assert_eq!(target.records("python").unwrap().len(), 2);
    }

    #[test]
    fn import_missing_file_is_an_error_and_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let mut kb = empty_kb();
        kb.learn("hello", "Hi", None).unwrap();

        let err = kb.import(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, KnowledgeError::Storage(StorageError::Unavailable { .. })));
        assert_eq!(kb.len(), 1);
    }

    #[test]
    fn history_limit_applies() {
        let mut kb = empty_kb().with_history_limit(Some(1));
        kb.learn("a", "1", None).unwrap();
        kb.learn("b", "2", None).unwrap();
        kb.get_response("a");
        kb.get_response("b");
        assert_eq!(kb.context().history.len(), 1);
        assert_eq!(kb.context().history[0].topic, "b");
    }
}
