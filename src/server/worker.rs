//! Return/renew worker
//!
//! Drains the pending queue (newest first), applies each request to the
//! catalog and replies. Exits on the quit sentinel, which the queue only
//! hands out once shutdown is requested and nothing is left pending.

use crate::{services::reply, AppState};

pub async fn run(state: AppState) -> usize {
    let mut processed = 0;

    loop {
        let request = state.library.pop().await;
        if request.is_quit() {
            break;
        }

        let outcome = state.library.settle(&request).await;
        match &outcome {
            Ok(receipt) => tracing::info!(
                operation = %receipt.transition,
                isbn = receipt.isbn,
                copy = receipt.copy,
                "Request settled"
            ),
            Err(e) => tracing::info!(
                operation = %request.operation,
                isbn = request.isbn,
                error = %e,
                "Request refused"
            ),
        }

        if let Some(text) = reply::reply_text(&outcome) {
            reply::send_reply(state.replies.as_ref(), request.requester, &text).await;
        }
        processed += 1;
    }

    tracing::info!(processed, "Worker finished");
    processed
}
