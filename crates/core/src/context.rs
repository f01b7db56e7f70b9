//! Conversation context — short-term memory of what was just discussed.
//!
//! Records the last resolved topic and the response given for it, plus a
//! history log of every successful knowledge lookup. The last topic biases
//! the next response selection towards records learned in that context.
//!
//! Context is session-scoped: it is never persisted and starts empty with
//! every new knowledge base instance.

use crate::knowledge::ResponseRecord;
use serde::Serialize;
use std::collections::VecDeque;

/// One successful lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// What the user actually typed
    pub input: String,
    /// The topic it resolved to
    pub topic: String,
    /// The record that was returned
    pub response: ResponseRecord,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationContext {
    pub last_topic: Option<String>,
    pub last_response: Option<ResponseRecord>,
    pub history: VecDeque<HistoryEntry>,

    /// Maximum history length; `None` keeps everything.
    #[serde(skip)]
    history_limit: Option<usize>,
}

impl ConversationContext {
    /// Empty context with an unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty context that evicts the oldest history entries past `limit`.
    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            history_limit: Some(limit),
            ..Self::default()
        }
    }

    /// Record a successful lookup.
    pub fn update(&mut self, topic: &str, response: &ResponseRecord, raw_input: &str) {
        self.last_topic = Some(topic.to_string());
        self.last_response = Some(response.clone());
        self.history.push_back(HistoryEntry {
            input: raw_input.to_string(),
            topic: topic.to_string(),
            response: response.clone(),
        });

        if let Some(limit) = self.history_limit {
            while self.history.len() > limit {
                self.history.pop_front();
            }
        }
    }

    pub fn history_limit(&self) -> Option<usize> {
        self.history_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(text: &str) -> ResponseRecord {
        ResponseRecord {
            text: text.into(),
            context: None,
            timestamp: 0.0,
        }
    }

    #[test]
    fn update_tracks_last_topic_and_history() {
        let mut ctx = ConversationContext::new();
        ctx.update("python", &record("Python is great"), "Pithon");

        assert_eq!(ctx.last_topic.as_deref(), Some("python"));
        assert_eq!(ctx.last_response.as_ref().unwrap().text, "Python is great");
        assert_eq!(ctx.history.len(), 1);
        assert_eq!(ctx.history[0].input, "Pithon");
        assert_eq!(ctx.history[0].topic, "python");
    }

    #[test]
    fn history_is_unbounded_by_default() {
        let mut ctx = ConversationContext::new();
        for i in 0..500 {
            ctx.update("t", &record(&i.to_string()), "t");
        }
        assert_eq!(ctx.history.len(), 500);
        assert_eq!(ctx.history_limit(), None);
    }

    #[test]
    fn history_limit_evicts_oldest() {
        let mut ctx = ConversationContext::with_history_limit(2);
        ctx.update("a", &record("1"), "a");
        ctx.update("b", &record("2"), "b");
        ctx.update("c", &record("3"), "c");

        let topics: Vec<_> = ctx.history.iter().map(|h| h.topic.as_str()).collect();
        assert_eq!(topics, vec!["b", "c"]);
        assert_eq!(ctx.last_topic.as_deref(), Some("c"));
    }
}
