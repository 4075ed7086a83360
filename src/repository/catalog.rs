//! In-memory catalog store

use crate::models::Book;

/// Maximum number of books held by a catalog
pub const MAX_BOOKS: usize = 100;

/// The book collection; single source of truth for copy availability
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    books: Vec<Book>,
}

/// One line of an availability report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine(pub String);

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_books(books: Vec<Book>) -> Self {
        Self { books }
    }

    /// Add a book, returning `false` once the catalog is full
    pub fn insert(&mut self, book: Book) -> bool {
        if self.books.len() >= MAX_BOOKS {
            return false;
        }
        self.books.push(book);
        true
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// First book matching `(name, isbn)`
    pub fn find(&self, name: &str, isbn: u32) -> Option<&Book> {
        self.books.iter().find(|b| b.matches(name, isbn))
    }

    pub fn find_mut(&mut self, name: &str, isbn: u32) -> Option<&mut Book> {
        self.books.iter_mut().find(|b| b.matches(name, isbn))
    }

    /// Per-copy availability, in catalog order:
    /// `status, name, isbn, copy number, due date`
    pub fn report(&self) -> Vec<ReportLine> {
        self.books
            .iter()
            .flat_map(|book| {
                book.copies.iter().map(move |copy| {
                    ReportLine(format!(
                        "{}, {}, {}, {}, {}",
                        copy.status, book.name, book.isbn, copy.number, copy.due_date
                    ))
                })
            })
            .collect()
    }
}

impl std::fmt::Display for ReportLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookCopy, CopyStatus, DueDate};

    fn sample() -> Catalog {
        let mut book = Book::new("Intro to OS", 100);
        book.add_copy(BookCopy::new(1, CopyStatus::Available, DueDate::new(1, 1, 2025)));
        book.add_copy(BookCopy::new(2, CopyStatus::Loaned, DueDate::new(9, 1, 2025)));
        Catalog::from_books(vec![book, Book::new("Compilers", 200)])
    }

    #[test]
    fn test_find_requires_exact_name_and_isbn() {
        let catalog = sample();
        assert!(catalog.find("Intro to OS", 100).is_some());
        assert!(catalog.find("intro to os", 100).is_none());
        assert!(catalog.find("Intro to OS", 101).is_none());
    }

    #[test]
    fn test_report_lists_every_copy() {
        let lines: Vec<String> = sample().report().into_iter().map(|l| l.to_string()).collect();
        assert_eq!(
            lines,
            vec![
                "D, Intro to OS, 100, 1, 01-01-2025".to_string(),
                "P, Intro to OS, 100, 2, 09-01-2025".to_string(),
            ]
        );
    }

    #[test]
    fn test_insert_stops_at_capacity() {
        let mut catalog = Catalog::new();
        for i in 0..MAX_BOOKS {
            assert!(catalog.insert(Book::new(format!("Book {}", i), i as u32)));
        }
        assert!(!catalog.insert(Book::new("One too many", 9999)));
        assert_eq!(catalog.len(), MAX_BOOKS);
    }
}
