//! Response selection — picks one record for a resolved topic.
//!
//! When the previous lookup resolved to topic `X`, records learned with
//! context `X` are preferred. Selection is uniform within whichever pool
//! applies, so repeated questions get varied answers.

use rand::Rng;
use rand::seq::IndexedRandom;
use zalo_core::context::ConversationContext;
use zalo_core::knowledge::ResponseRecord;

#[derive(Debug, Clone, Copy)]
pub struct ResponseSelector {
    context_sensitive: bool,
}

impl Default for ResponseSelector {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ResponseSelector {
    /// With `context_sensitive = false` the full record list is always used.
    pub fn new(context_sensitive: bool) -> Self {
        Self { context_sensitive }
    }

    /// Choose a record. `None` only when `records` is empty.
    pub fn select<'a, R: Rng + ?Sized>(
        &self,
        records: &'a [ResponseRecord],
        context: &ConversationContext,
        rng: &mut R,
    ) -> Option<&'a ResponseRecord> {
        if self.context_sensitive {
            if let Some(last_topic) = context.last_topic.as_deref() {
                let in_context: Vec<&ResponseRecord> = records
                    .iter()
                    .filter(|r| r.context.as_deref() == Some(last_topic))
                    .collect();
                if let Some(record) = in_context.choose(rng) {
                    return Some(*record);
                }
            }
        }

        records.choose(rng)
    }
}
