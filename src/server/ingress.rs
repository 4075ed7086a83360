//! Inbound request loop
//!
//! Reads frames from the inbound pipe and dispatches them: loans run inline
//! before the next frame is read, returns and renewals go to the pending
//! queue, quit raises the shutdown flag. Malformed frames are logged and
//! dropped without a reply.

use tokio::io::AsyncRead;

use crate::{
    error::AppResult,
    models::{Operation, Request},
    protocol::{self, FrameReader},
    services::reply,
    AppState,
};

/// Counters reported when ingress stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngressStats {
    pub loans: usize,
    pub queued: usize,
    pub dropped: usize,
}

enum Flow {
    Continue,
    Stop,
}

pub struct Ingress {
    state: AppState,
    verbose: bool,
    stats: IngressStats,
}

impl Ingress {
    pub fn new(state: AppState, verbose: bool) -> Self {
        Self {
            state,
            verbose,
            stats: IngressStats::default(),
        }
    }

    /// Serve requests from `reader` until quit, shutdown or end of input
    pub async fn run<R: AsyncRead + Unpin>(mut self, reader: R) -> AppResult<IngressStats> {
        let mut frames = FrameReader::new(reader);
        let mut shutdown = self.state.library.shutdown_signal();

        loop {
            let frame = tokio::select! {
                frame = frames.next_frame() => frame?,
                _ = shutdown.wait_for(|down| *down) => {
                    tracing::debug!("Ingress stopping: shutdown requested");
                    break;
                }
            };

            let Some(frame) = frame else {
                tracing::info!("Inbound channel closed");
                self.state.library.request_shutdown().await;
                break;
            };

            if let Flow::Stop = self.handle(&frame).await {
                break;
            }
        }

        tracing::info!(
            loans = self.stats.loans,
            queued = self.stats.queued,
            dropped = self.stats.dropped,
            "Ingress stopped"
        );
        Ok(self.stats)
    }

    async fn handle(&mut self, frame: &[u8]) -> Flow {
        let request = match protocol::decode_request(frame) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed request");
                self.stats.dropped += 1;
                return Flow::Continue;
            }
        };

        if self.verbose {
            tracing::info!(
                operation = %request.operation,
                book = %request.book,
                isbn = request.isbn,
                requester = request.requester,
                "Received"
            );
        } else {
            tracing::debug!(operation = %request.operation, isbn = request.isbn, requester = request.requester, "Received");
        }

        match request.operation {
            Operation::Loan => {
                self.lend(&request).await;
                Flow::Continue
            }
            Operation::Return | Operation::Renew => {
                let requester = request.requester;
                match self.state.library.push(request).await {
                    Ok(()) => self.stats.queued += 1,
                    Err(e) => {
                        tracing::warn!(requester, error = %e, "Request not queued");
                        self.stats.dropped += 1;
                    }
                }
                Flow::Continue
            }
            Operation::Quit => {
                tracing::info!(requester = request.requester, "Quit received");
                self.state.library.request_shutdown().await;
                Flow::Stop
            }
        }
    }

    async fn lend(&mut self, request: &Request) {
        let outcome = self.state.library.lend(request).await;
        match &outcome {
            Ok(receipt) => {
                tracing::info!(isbn = receipt.isbn, copy = receipt.copy, due = %receipt.due_date, "Loan granted");
                self.stats.loans += 1;
            }
            Err(e) => tracing::info!(isbn = request.isbn, error = %e, "Loan refused"),
        }

        if let Some(text) = reply::reply_text(&outcome) {
            reply::send_reply(self.state.replies.as_ref(), request.requester, &text).await;
        }
    }
}
