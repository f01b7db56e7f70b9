//! Knowledge base for Zalo.
//!
//! Learned topics are resolved by exact lookup first and by approximate
//! string matching second; the response is then picked with a bias towards
//! whatever was discussed just before.

pub mod base;
pub mod file_store;
pub mod in_memory;
pub mod matcher;
pub mod selector;

pub use base::{ForgetOutcome, KnowledgeBase, Learned};
pub use file_store::JsonFileStore;
pub use in_memory::InMemoryStore;
pub use matcher::{DEFAULT_SIMILARITY_THRESHOLD, TopicMatcher, similarity_ratio};
pub use selector::ResponseSelector;
