//! Input channels for Zalo.
//!
//! Each channel turns some input surface into a stream of
//! [`ChannelMessage`](zalo_core::ChannelMessage)s and carries replies back.
//!
//! Available channels:
//! - **CLI** — Interactive terminal chat (stdin/stdout)

pub mod cli;

pub use cli::{CliChannel, is_exit_word};
