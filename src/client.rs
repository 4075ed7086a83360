//! Requester: the client side of the protocol
//!
//! A requester owns a private reply pipe named after its id, writes framed
//! requests to the server's inbound pipe and waits a bounded time for each
//! reply.

use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::unix::pipe;

use crate::{
    config::ClientConfig,
    error::{AppError, AppResult},
    fifo,
    models::{book::MAX_NAME_LEN, Operation, Request},
    protocol::{self, FrameReader, QUIT_BOOK_NAME},
};

pub struct Requester {
    id: u32,
    inbound: pipe::Sender,
    reply_path: PathBuf,
    replies: FrameReader<pipe::Receiver>,
    config: ClientConfig,
}

impl Requester {
    /// Connect using the process id as requester id
    pub async fn connect(inbound: &Path, reply_dir: &Path, config: ClientConfig) -> AppResult<Self> {
        Self::connect_as(std::process::id(), inbound, reply_dir, config).await
    }

    pub async fn connect_as(
        id: u32,
        inbound: &Path,
        reply_dir: &Path,
        config: ClientConfig,
    ) -> AppResult<Self> {
        let sender = fifo::open_writer(inbound)?;

        let reply_path = protocol::reply_pipe_path(reply_dir, id);
        fifo::create(&reply_path)?;
        let receiver = match fifo::open_reader(&reply_path) {
            Ok(receiver) => receiver,
            Err(e) => {
                fifo::remove(&reply_path);
                return Err(e);
            }
        };

        tracing::debug!(id, reply = %reply_path.display(), "Requester connected");
        Ok(Self {
            id,
            inbound: sender,
            reply_path,
            replies: FrameReader::new(receiver),
            config,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub async fn send(&mut self, operation: Operation, book: &str, isbn: u32) -> AppResult<()> {
        let request = Request::new(operation, book, isbn, self.id);
        self.inbound.write_all(&protocol::encode_request(&request)).await?;
        Ok(())
    }

    /// Wait for the next reply; `None` once the polls run out
    pub async fn await_reply(&mut self) -> AppResult<Option<String>> {
        for _ in 0..self.config.reply_polls.max(1) {
            match tokio::time::timeout(self.config.poll_interval(), self.replies.next_frame()).await {
                Ok(Ok(Some(frame))) => return Ok(Some(String::from_utf8_lossy(&frame).into_owned())),
                Ok(Ok(None)) => {
                    return Err(AppError::ChannelUnavailable(format!(
                        "{} was closed",
                        self.reply_path.display()
                    )))
                }
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => continue,
            }
        }
        Ok(None)
    }

    /// Send a loan, return or renewal and wait for its reply
    pub async fn request(&mut self, operation: Operation, book: &str, isbn: u32) -> AppResult<Option<String>> {
        self.send(operation, book, isbn).await?;
        self.await_reply().await
    }

    /// Ask the server to stop; no reply is sent for this
    pub async fn quit(&mut self) -> AppResult<()> {
        self.send(Operation::Quit, QUIT_BOOK_NAME, 0).await
    }
}

impl Drop for Requester {
    fn drop(&mut self) {
        fifo::remove(&self.reply_path);
    }
}

/// Parse a batch line: `<type>, <name>, <isbn>`
pub fn parse_batch_line(line: &str) -> AppResult<(Operation, String, u32)> {
    let bad = |what: &str| AppError::Parse(format!("{} in '{}'", what, line));

    let mut fields = line.trim().splitn(3, ',').map(str::trim);
    let kind = fields.next().unwrap_or_default();
    let mut kind_chars = kind.chars();
    let operation = match (kind_chars.next(), kind_chars.next()) {
        (Some(c), None) => Operation::from_code(c).ok_or_else(|| bad("unknown operation"))?,
        _ => return Err(bad("operation must be a single letter")),
    };

    let name = fields.next().filter(|n| !n.is_empty()).ok_or_else(|| bad("missing book name"))?;
    if name.len() > MAX_NAME_LEN {
        return Err(bad("book name too long"));
    }
    let isbn = fields
        .next()
        .ok_or_else(|| bad("missing isbn"))?
        .parse()
        .map_err(|_| bad("invalid isbn"))?;

    Ok((operation, name.to_string(), isbn))
}

/// Outcome of a batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub sent: usize,
    pub answered: usize,
    pub skipped: usize,
    pub quit_sent: bool,
}

/// Send every request line of `input`, writing each reply to `out`.
///
/// A `Q` line sends quit and ends the batch.
pub async fn run_batch<R, W>(requester: &mut Requester, input: R, out: &mut W) -> AppResult<BatchSummary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut summary = BatchSummary::default();
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let (operation, book, isbn) = match parse_batch_line(&line) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping batch line");
                summary.skipped += 1;
                continue;
            }
        };

        if operation == Operation::Quit {
            requester.quit().await?;
            summary.quit_sent = true;
            break;
        }

        summary.sent += 1;
        let text = match requester.request(operation, &book, isbn).await? {
            Some(reply) => {
                summary.answered += 1;
                format!("Reply for {} ISBN {}: {}\n", operation, isbn, reply)
            }
            None => format!("No reply for {} ISBN {}\n", operation, isbn),
        };
        out.write_all(text.as_bytes()).await?;
        out.flush().await?;
    }

    Ok(summary)
}
