//! Business logic services

pub mod library;
pub mod loans;
pub mod reply;

pub use library::Library;
pub use reply::{FifoReplySink, ReplySink};
