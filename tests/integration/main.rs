//! Integration tests for the booklend server

mod scenario_tests;
mod server_tests;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use booklend::{
    config::AppConfig,
    models::{Book, BookCopy, CopyStatus, DueDate},
    repository::Catalog,
    services::{Library, ReplySink},
    AppResult, AppState,
};

/// Reply sink that remembers what it was asked to deliver
#[derive(Default)]
pub struct RecordingSink {
    replies: Mutex<Vec<(u32, String)>>,
}

impl RecordingSink {
    pub fn replies(&self) -> Vec<(u32, String)> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReplySink for RecordingSink {
    async fn deliver(&self, requester: u32, text: &str) -> AppResult<()> {
        self.replies.lock().unwrap().push((requester, text.to_string()));
        Ok(())
    }
}

pub fn book(name: &str, isbn: u32, statuses: &[CopyStatus]) -> Book {
    let mut book = Book::new(name, isbn);
    for (i, status) in statuses.iter().enumerate() {
        book.add_copy(BookCopy::new(i as u32 + 1, *status, DueDate::new(10, 6, 2025)));
    }
    book
}

pub fn state(books: Vec<Book>) -> (AppState, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let config = AppConfig::default();
    let state = AppState {
        library: Library::new(Catalog::from_books(books), config.queue.capacity),
        config: Arc::new(config),
        replies: sink.clone(),
    };
    (state, sink)
}
