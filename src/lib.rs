//! Booklend Library Loan Service
//!
//! A server that owns a book catalog and serves loan, return and renewal
//! requests sent by client processes over named pipes, plus the client-side
//! requester.

use std::sync::Arc;

pub mod client;
pub mod config;
pub mod error;
pub mod fifo;
pub mod logging;
pub mod models;
pub mod protocol;
pub mod queue;
pub mod repository;
pub mod server;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// State shared by the ingress loop, the worker and the console
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub library: Arc<services::Library>,
    pub replies: Arc<dyn services::ReplySink>,
}
