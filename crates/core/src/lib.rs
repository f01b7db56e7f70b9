//! # Zalo Core
//!
//! Domain types, traits, and error definitions for the Zalo assistant.
//! Every other crate in the workspace depends inward on this one.
//!
//! Subsystems with more than one implementation (knowledge storage,
//! channels) are defined as traits here so they can be swapped for
//! in-memory stand-ins in tests.

pub mod channel;
pub mod context;
pub mod error;
pub mod knowledge;
pub mod storage;

// Re-export key types at crate root for ergonomics
pub use channel::{Channel, ChannelId, ChannelMessage};
pub use context::{ConversationContext, HistoryEntry};
pub use error::{ChannelError, Error, KnowledgeError, Result, StorageError};
pub use knowledge::{
    KnowledgeDocument, KnowledgeStorage, Metadata, ResponseRecord, normalize_topic,
};
