//! Reply delivery to requesters

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::unix::pipe;

use crate::{
    config::ReplyConfig,
    error::{AppError, AppResult},
    fifo,
    models::Receipt,
    protocol,
};

/// Destination for the one textual reply each request receives
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn deliver(&self, requester: u32, text: &str) -> AppResult<()>;
}

/// Writes replies to `pipe_<requester>` in a directory
#[derive(Debug, Clone)]
pub struct FifoReplySink {
    directory: PathBuf,
    attempts: u32,
    retry_delay: Duration,
    deadline: Duration,
}

impl FifoReplySink {
    pub fn new(config: &ReplyConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            attempts: config.attempts.max(1),
            retry_delay: config.retry_delay(),
            deadline: config.deadline(),
        }
    }

    async fn open_with_retry(&self, path: &std::path::Path) -> AppResult<pipe::Sender> {
        let mut last_error = None;
        for attempt in 1..=self.attempts {
            match fifo::open_writer(path) {
                Ok(sender) => return Ok(sender),
                Err(e) => {
                    tracing::debug!(path = %path.display(), attempt, error = %e, "Reply pipe not ready");
                    last_error = Some(e);
                }
            }
            if attempt < self.attempts {
                tokio::time::sleep(self.retry_delay).await;
            }
        }
        Err(AppError::ChannelUnavailable(format!(
            "{} after {} attempts: {}",
            path.display(),
            self.attempts,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }
}

#[async_trait]
impl ReplySink for FifoReplySink {
    async fn deliver(&self, requester: u32, text: &str) -> AppResult<()> {
        let path = protocol::reply_pipe_path(&self.directory, requester);
        let frame = protocol::encode_reply(text);

        let send = async {
            let mut sender = self.open_with_retry(&path).await?;
            sender.write_all(&frame).await?;
            Ok::<_, AppError>(())
        };

        tokio::time::timeout(self.deadline + self.retry_delay, send)
            .await
            .map_err(|_| {
                AppError::ChannelUnavailable(format!("{} timed out", path.display()))
            })?
    }
}

/// Reply text for the outcome of a catalog operation.
///
/// `None` means the failure is not the requester's business and is only
/// logged.
pub fn reply_text(outcome: &AppResult<Receipt>) -> Option<String> {
    match outcome {
        Ok(receipt) => Some(receipt.reply_text()),
        Err(e) if e.is_reportable() => Some(e.reply_text()),
        Err(_) => None,
    }
}

/// Deliver a reply; failures are logged and the reply is dropped
pub async fn send_reply(sink: &dyn ReplySink, requester: u32, text: &str) {
    match sink.deliver(requester, text).await {
        Ok(()) => tracing::debug!(requester, reply = text, "Reply delivered"),
        Err(e) => tracing::warn!(requester, error = %e, "Reply abandoned"),
    }
}
