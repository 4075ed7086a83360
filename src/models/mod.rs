//! Data models for booklend

pub mod book;
pub mod copy;
pub mod due_date;
pub mod request;

// Re-export commonly used types
pub use book::Book;
pub use copy::{BookCopy, CopyStatus};
pub use due_date::DueDate;
pub use request::{Operation, Receipt, Request, Transition};
