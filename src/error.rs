//! Error types for the booklend server and client

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed input: {0}")]
    Parse(String),

    #[error("ISBN {isbn} not found or wrong name")]
    BookNotFound { isbn: u32 },

    #[error("no copy available for ISBN {isbn}")]
    NoCopyAvailable { isbn: u32 },

    #[error("no loaned copy for ISBN {isbn}")]
    NoLoanedCopy { isbn: u32 },

    #[error("Reply channel unavailable: {0}")]
    ChannelUnavailable(String),

    #[error("Server is shutting down")]
    ShuttingDown,

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error is reported back to the requester as a reply.
    ///
    /// Lookup failures are part of normal service; everything else is
    /// logged server-side only.
    pub fn is_reportable(&self) -> bool {
        matches!(
            self,
            AppError::BookNotFound { .. }
                | AppError::NoCopyAvailable { .. }
                | AppError::NoLoanedCopy { .. }
        )
    }

    /// Text sent to the requester for a reportable error.
    pub fn reply_text(&self) -> String {
        format!("Error: {}", self)
    }
}

impl From<nix::errno::Errno> for AppError {
    fn from(e: nix::errno::Errno) -> Self {
        AppError::Io(std::io::Error::from(e))
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
