//! Task tracking for Zalo: a persistent task list plus the date parser used
//! for due dates.

pub mod date_parser;
pub mod store;

pub use date_parser::parse_date_from;
pub use store::{Task, TaskEdit, TaskStatus, TaskStore};
