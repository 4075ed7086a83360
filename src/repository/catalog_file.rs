//! Flat-file catalog store
//!
//! ```text
//! <name>,<isbn>,<numCopies>
//! <copyNumber>,<status:D|P>,<dd-mm-yyyy>
//! ```

use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{MAX_COPIES, MAX_NAME_LEN},
        due_date::FALLBACK_DATE,
        Book, BookCopy, CopyStatus, DueDate,
    },
};

use super::catalog::Catalog;

/// Load a catalog file from disk.
///
/// Unreadable lines are logged and skipped. An empty result is an error.
pub async fn load(path: impl AsRef<Path>) -> AppResult<Catalog> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path).await?;
    let catalog = parse(&text);

    if catalog.is_empty() {
        return Err(AppError::Parse(format!(
            "no books could be loaded from {}",
            path.display()
        )));
    }

    tracing::info!(books = catalog.len(), path = %path.display(), "Catalog loaded");
    Ok(catalog)
}

/// Write the catalog back in the same format it was loaded from.
pub async fn save(path: impl AsRef<Path>, catalog: &Catalog) -> AppResult<()> {
    let path = path.as_ref();
    tokio::fs::write(path, render(catalog)).await?;
    tracing::info!(books = catalog.len(), path = %path.display(), "Catalog saved");
    Ok(())
}

pub fn render(catalog: &Catalog) -> String {
    let mut out = String::new();
    for book in catalog.books() {
        out.push_str(&format!("{},{},{}\n", book.name, book.isbn, book.copies.len()));
        for copy in &book.copies {
            out.push_str(&format!("{},{},{}\n", copy.number, copy.status, copy.due_date));
        }
    }
    out
}

pub fn parse(text: &str) -> Catalog {
    let mut catalog = Catalog::new();
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty()).peekable();

    while let Some(line) = lines.next() {
        let (name, isbn, count) = match parse_header(line) {
            Ok(header) => header,
            Err(e) => {
                tracing::warn!(line, error = %e, "Skipping catalog line");
                continue;
            }
        };

        if count == 0 || count > MAX_COPIES {
            tracing::warn!(isbn, count, "Invalid number of copies, skipping book");
            while lines.peek().is_some_and(|l| parse_copy(l).is_ok()) {
                lines.next();
            }
            continue;
        }

        let mut book = Book::new(name, isbn);
        for _ in 0..count {
            let Some(line) = lines.next() else { break };
            match parse_copy(line) {
                Ok(copy) => {
                    let number = copy.number;
                    if !book.add_copy(copy) {
                        tracing::warn!(isbn, copy = number, "Duplicate copy number, skipping");
                    }
                }
                Err(e) => tracing::warn!(line, error = %e, "Skipping copy line"),
            }
        }

        if book.copies.is_empty() {
            tracing::warn!(isbn, "No readable copies, skipping book");
            continue;
        }

        tracing::debug!(name = %book.name, isbn, copies = book.copies.len(), "Book read");
        if !catalog.insert(book) {
            tracing::warn!("Catalog is full, ignoring remaining books");
            break;
        }
    }

    catalog
}

fn parse_header(line: &str) -> AppResult<(&str, u32, usize)> {
    let bad = || AppError::Parse(format!("invalid book header '{}'", line));

    let mut fields = line.splitn(3, ',');
    let name = fields.next().filter(|n| !n.is_empty()).ok_or_else(bad)?;
    if name.len() > MAX_NAME_LEN {
        return Err(bad());
    }
    let isbn = fields.next().ok_or_else(bad)?.trim().parse().map_err(|_| bad())?;
    let count = fields.next().ok_or_else(bad)?.trim().parse().map_err(|_| bad())?;

    Ok((name, isbn, count))
}

fn parse_copy(line: &str) -> AppResult<BookCopy> {
    let bad = || AppError::Parse(format!("invalid copy line '{}'", line));

    let mut fields = line.splitn(3, ',').map(str::trim);
    let number = fields.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;

    let mut code = fields.next().ok_or_else(bad)?.chars();
    let status = match (code.next(), code.next()) {
        (Some(c), None) => CopyStatus::from_code(c).ok_or_else(bad)?,
        _ => return Err(bad()),
    };

    let raw_date = fields.next().ok_or_else(bad)?;
    let due_date = raw_date.parse::<DueDate>().unwrap_or_else(|_| {
        tracing::warn!(date = raw_date, "Unreadable date, using {}", FALLBACK_DATE);
        FALLBACK_DATE
    });

    Ok(BookCopy::new(number, status, due_date))
}
