//! Server orchestration
//!
//! Startup creates and opens the inbound pipe and loads the catalog; any
//! failure there aborts before service starts. Then the worker and the
//! console are spawned and ingress runs on the calling task. When ingress
//! stops, shutdown is raised (a no-op if already raised), the worker
//! drains the queue, both tasks are joined, the catalog is optionally
//! saved and the inbound pipe is removed.

pub mod console;
pub mod ingress;
pub mod worker;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::AsyncWrite;
use tokio::sync::mpsc;

use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
    fifo,
    repository::catalog_file,
    services::{FifoReplySink, Library},
    AppState,
};

pub use ingress::{Ingress, IngressStats};

/// Per-run settings, usually from the command line
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Inbound pipe path
    pub inbound: PathBuf,
    /// Catalog file to load
    pub catalog: PathBuf,
    /// Where to write the final catalog, if anywhere
    pub save_to: Option<PathBuf>,
    pub verbose: bool,
}

/// What happened during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerSummary {
    pub ingress: IngressStats,
    /// Returns and renewals settled by the worker
    pub settled: usize,
}

pub struct Server {
    config: AppConfig,
    options: ServerOptions,
}

impl Server {
    pub fn new(config: AppConfig, options: ServerOptions) -> Self {
        Self { config, options }
    }

    /// Serve until shutdown. `console_input` feeds operator commands and
    /// `console_output` receives prompts and reports.
    pub async fn run<W>(
        self,
        console_input: mpsc::Receiver<String>,
        console_output: W,
    ) -> AppResult<ServerSummary>
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let inbound_path = self.options.inbound.clone();
        fifo::create(&inbound_path)?;

        let result = self.serve(console_input, console_output).await;
        fifo::remove(&inbound_path);
        result
    }

    async fn serve<W>(
        self,
        console_input: mpsc::Receiver<String>,
        console_output: W,
    ) -> AppResult<ServerSummary>
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let inbound = fifo::open_reader(&self.options.inbound)?;
        let catalog = catalog_file::load(&self.options.catalog).await?;

        let state = AppState {
            replies: Arc::new(FifoReplySink::new(&self.config.reply)),
            library: Library::new(catalog, self.config.queue.capacity),
            config: Arc::new(self.config),
        };

        tracing::info!(
            pipe = %self.options.inbound.display(),
            capacity = state.config.queue.capacity,
            "Server ready"
        );

        let worker = tokio::spawn(worker::run(state.clone()));
        let console = tokio::spawn(console::run(state.clone(), console_input, console_output));

        let ingress = Ingress::new(state.clone(), self.options.verbose)
            .run(inbound)
            .await;
        if let Err(e) = &ingress {
            tracing::error!(error = %e, "Ingress failed");
        }
        state.library.request_shutdown().await;

        let settled = worker
            .await
            .map_err(|e| AppError::Internal(format!("worker task failed: {}", e)))?;
        match console.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "Console stopped with an error"),
            Err(e) => tracing::warn!(error = %e, "Console task failed"),
        }

        if let Some(path) = &self.options.save_to {
            catalog_file::save(path, &state.library.snapshot().await).await?;
        }

        tracing::info!(settled, "Server stopped");
        Ok(ServerSummary {
            ingress: ingress?,
            settled,
        })
    }
}
