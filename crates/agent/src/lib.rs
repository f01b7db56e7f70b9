//! The Zalo assistant — everything between a typed line and the reply.
//!
//! 1. **Parse** the line into a [`Command`] (notes, tasks, knowledge) or chat
//! 2. **Route** commands to the note store, task store, or knowledge base
//! 3. **Converse**: chat goes to learned knowledge first, then the
//!    small-talk [`Responder`], then a fallback
//!
//! [`Assistant::respond`] never fails; storage problems come back as text.

pub mod assistant;
pub mod command;
pub mod responder;

pub use assistant::{Assistant, HELP, open_knowledge};
pub use command::Command;
pub use responder::{FALLBACK_REPLY, Responder};
