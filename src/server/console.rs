//! Operator console
//!
//! `s` (or `q`, `quit`) stops the server, `r` (or `report`) prints every
//! copy with its status and due date. Anything else re-prompts.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::{error::AppResult, AppState};

const HELP: &str = "Use 's' to stop the server or 'r' for a report\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Report,
    Unknown,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "s" | "q" | "quit" => Command::Quit,
            "r" | "report" => Command::Report,
            _ => Command::Unknown,
        }
    }
}

/// Forward stdin lines to the console.
///
/// Stdin is read on a plain OS thread; a blocked read there does not keep
/// the runtime from shutting down.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Run the console until quit, shutdown from elsewhere, or end of input
pub async fn run<W>(state: AppState, mut input: mpsc::Receiver<String>, mut out: W) -> AppResult<()>
where
    W: AsyncWrite + Unpin,
{
    let mut shutdown = state.library.shutdown_signal();
    out.write_all(HELP.as_bytes()).await?;
    out.flush().await?;

    loop {
        let line = tokio::select! {
            line = input.recv() => line,
            _ = shutdown.wait_for(|down| *down) => break,
        };
        let Some(line) = line else {
            tracing::debug!("Console input closed");
            break;
        };

        match Command::parse(&line) {
            Command::Quit => {
                state.library.request_shutdown().await;
                break;
            }
            Command::Report => {
                let report = state.library.report().await;
                let mut text = String::from("Report:\n");
                for line in report {
                    text.push_str(&format!("{}\n", line));
                }
                out.write_all(text.as_bytes()).await?;
            }
            Command::Unknown => out.write_all(HELP.as_bytes()).await?,
        }
        out.flush().await?;
    }

    tracing::debug!("Console stopped");
    Ok(())
}
