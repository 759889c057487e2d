//! Console runner: one `sender: text` line per message on stdin, replies on stdout.
//!
//! Lines without a `sender:` prefix come from [`DEFAULT_CONSOLE_SENDER`]. Each line gets its
//! own delivery id, so the console never exercises deduplication.

use async_trait::async_trait;
use quizbot_core::{Bot, InboundMessage, QuizbotError, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::error;

use crate::router::Router;
use crate::runner::{process_message, ReplyTexts};

pub const DEFAULT_CONSOLE_SENDER: &str = "console";

/// Writes `[recipient] text` lines to the wrapped writer.
pub struct ConsoleBot<W> {
    out: Mutex<W>,
}

impl<W> ConsoleBot<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> Bot for ConsoleBot<W> {
    async fn send_message(&self, recipient: &str, text: &str) -> Result<()> {
        let mut out = self.out.lock().await;
        out.write_all(format!("[{}] {}\n", recipient, text).as_bytes())
            .await
            .map_err(|e| QuizbotError::Bot(e.to_string()))?;
        out.flush().await.map_err(|e| QuizbotError::Bot(e.to_string()))?;
        Ok(())
    }
}

/// Splits `sender: text`. A line with no colon, or an empty sender, uses the default sender.
pub fn parse_line(line: &str) -> (String, String) {
    match line.split_once(':') {
        Some((sender, text)) if !sender.trim().is_empty() && !sender.trim().contains(' ') => {
            (sender.trim().to_string(), text.trim().to_string())
        }
        _ => (DEFAULT_CONSOLE_SENDER.to_string(), line.trim().to_string()),
    }
}

/// Routes every non-blank line of `input`; returns how many lines were routed.
pub async fn run_console<R>(
    router: &Router,
    texts: &ReplyTexts,
    input: R,
    bot: &dyn Bot,
) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut routed = 0usize;
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        routed += 1;
        let (sender, text) = parse_line(&line);
        let message = InboundMessage::new(sender, text, format!("console:{}", routed));
        if let Err(e) = process_message(router, bot, texts, &message).await {
            error!(error = %e, "Failed to write console reply");
            return Err(e);
        }
    }
    Ok(routed)
}
