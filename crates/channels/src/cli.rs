//! CLI channel — interactive terminal chat.
//!
//! Reads lines from stdin (or any async reader), writes replies to stdout.
//! Used for `zalo chat`.
//!
//! Blank lines before the first message are dropped; after that they are
//! forwarded as empty messages so the assistant can nudge an idle user.

use async_trait::async_trait;
use std::sync::Mutex;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;
use zalo_core::channel::{Channel, ChannelId, ChannelMessage};
use zalo_core::error::ChannelError;

type LineSource = Box<dyn AsyncBufRead + Unpin + Send>;

/// Words that end the session.
const EXIT_WORDS: &[&str] = &["bye", "exit", "quit", "/exit", "/quit", ":q"];

pub fn is_exit_word(line: &str) -> bool {
    EXIT_WORDS.iter().any(|w| line.eq_ignore_ascii_case(w))
}

/// Interactive CLI channel for terminal-based chat.
pub struct CliChannel {
    id: ChannelId,
    sender_name: String,
    source: Mutex<Option<LineSource>>,
}

impl CliChannel {
    /// Channel over the process's stdin.
    pub fn new(sender_name: &str) -> Self {
        Self::with_reader(sender_name, BufReader::new(io::stdin()))
    }

    /// Channel over an arbitrary line source.
    pub fn with_reader(
        sender_name: &str,
        reader: impl AsyncBufRead + Unpin + Send + 'static,
    ) -> Self {
        Self {
            id: ChannelId("cli".into()),
            sender_name: sender_name.to_string(),
            source: Mutex::new(Some(Box::new(reader))),
        }
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    fn id(&self) -> &ChannelId {
        &self.id
    }

    async fn start(
        &self,
    ) -> Result<mpsc::Receiver<Result<ChannelMessage, ChannelError>>, ChannelError> {
        let source = self
            .source
            .lock()
            .map_err(|_| ChannelError::NotConfigured("input source poisoned".into()))?
            .take()
            .ok_or_else(|| ChannelError::NotConfigured("channel already started".into()))?;

        let (tx, rx) = mpsc::channel(32);
        let channel_id = self.id.clone();
        let sender_name = self.sender_name.clone();

        tokio::spawn(async move {
            let mut lines = source.lines();
            let mut spoken = false;

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim().to_string();
                        if line.is_empty() && !spoken {
                            continue;
                        }
                        spoken = true;

                        if is_exit_word(&line) {
                            debug!("Exit requested");
                            break;
                        }

                        let msg = ChannelMessage {
                            channel_id: channel_id.clone(),
                            sender_id: "local_user".into(),
                            sender_name: Some(sender_name.clone()),
                            content: line,
                        };

                        if tx.send(Ok(msg)).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF (Ctrl+D)
                    Err(e) => {
                        let _ = tx
                            .send(Err(ChannelError::ConnectionLost(e.to_string())))
                            .await;
                        break;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn send(&self, content: &str) -> Result<(), ChannelError> {
        println!("{content}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(input: &'static str) -> Vec<String> {
        let ch = CliChannel::with_reader("Twistz", input.as_bytes());
        let mut rx = ch.start().await.unwrap();
        let mut out = Vec::new();
        while let Some(msg) = rx.recv().await {
            out.push(msg.unwrap().content);
        }
        out
    }

    #[test]
    fn cli_channel_properties() {
        let ch = CliChannel::with_reader("Twistz", &b""[..]);
        assert_eq!(ch.name(), "cli");
        assert_eq!(ch.id().0, "cli");
    }

    #[tokio::test]
    async fn blank_lines_after_first_message_are_forwarded() {
        let lines = collect("\n  \nhello\n\n   \nlist notes\n").await;
        assert_eq!(lines, vec!["hello", "", "", "list notes"]);
    }

    #[tokio::test]
    async fn exit_words_end_the_stream() {
        let lines = collect("hi\nQUIT\nnever seen\n").await;
        assert_eq!(lines, vec!["hi"]);
    }

    #[tokio::test]
    async fn start_twice_is_an_error() {
        let ch = CliChannel::with_reader("Twistz", &b"hi\n"[..]);
        assert!(ch.start().await.is_ok());
        assert!(matches!(
            ch.start().await,
            Err(ChannelError::NotConfigured(_))
        ));
    }

    #[test]
    fn exit_word_matching() {
        assert!(is_exit_word("Bye"));
        assert!(is_exit_word(":q"));
        assert!(!is_exit_word("goodbye"));
    }
}
