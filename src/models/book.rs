//! Book (catalog entry) model

use super::copy::BookCopy;

/// Maximum number of copies a book may hold
pub const MAX_COPIES: usize = 10;

/// Maximum length of a book name, in bytes
pub const MAX_NAME_LEN: usize = 249;

/// A catalog entry with its ordered copies.
///
/// Books are keyed by `(name, isbn)`; the name match is exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub name: String,
    pub isbn: u32,
    pub copies: Vec<BookCopy>,
}

impl Book {
    pub fn new(name: impl Into<String>, isbn: u32) -> Self {
        Self {
            name: name.into(),
            isbn,
            copies: Vec::new(),
        }
    }

    pub fn matches(&self, name: &str, isbn: u32) -> bool {
        self.isbn == isbn && self.name == name
    }

    /// Add a copy, refusing duplicate copy numbers and overflow.
    ///
    /// Returns `false` when the copy was not added.
    pub fn add_copy(&mut self, copy: BookCopy) -> bool {
        if self.copies.len() >= MAX_COPIES || self.copy(copy.number).is_some() {
            return false;
        }
        self.copies.push(copy);
        true
    }

    pub fn copy(&self, number: u32) -> Option<&BookCopy> {
        self.copies.iter().find(|c| c.number == number)
    }

    /// First copy on the shelf, in catalog order
    pub fn first_available_mut(&mut self) -> Option<&mut BookCopy> {
        self.copies.iter_mut().find(|c| c.is_available())
    }

    /// First lent-out copy, in catalog order
    pub fn first_loaned_mut(&mut self) -> Option<&mut BookCopy> {
        self.copies.iter_mut().find(|c| c.is_loaned())
    }
}
