//! Loan state machine
//!
//! Copies move Available → Loaned on loan and Loaned → Available on return.
//! Renewal only pushes the due date. In every case the first eligible copy
//! in catalog order is the one acted upon.

use crate::{
    error::{AppError, AppResult},
    models::{CopyStatus, DueDate, Operation, Receipt, Request, Transition},
    repository::Catalog,
};

/// Lend the first available copy of a book; due one term after `today`
pub fn lend(catalog: &mut Catalog, book: &str, isbn: u32, today: DueDate) -> AppResult<Receipt> {
    let book = catalog
        .find_mut(book, isbn)
        .ok_or(AppError::BookNotFound { isbn })?;
    let copy = book
        .first_available_mut()
        .ok_or(AppError::NoCopyAvailable { isbn })?;

    copy.status = CopyStatus::Loaned;
    copy.due_date = today.extended();

    Ok(Receipt {
        transition: Transition::Loan,
        isbn,
        copy: copy.number,
        due_date: copy.due_date,
    })
}

/// Put the first loaned copy of a book back on the shelf
pub fn give_back(catalog: &mut Catalog, book: &str, isbn: u32) -> AppResult<Receipt> {
    let book = catalog
        .find_mut(book, isbn)
        .ok_or(AppError::BookNotFound { isbn })?;
    let copy = book
        .first_loaned_mut()
        .ok_or(AppError::NoLoanedCopy { isbn })?;

    copy.status = CopyStatus::Available;

    Ok(Receipt {
        transition: Transition::Return,
        isbn,
        copy: copy.number,
        due_date: copy.due_date,
    })
}

/// Extend the first loaned copy of a book by one term
pub fn renew(catalog: &mut Catalog, book: &str, isbn: u32) -> AppResult<Receipt> {
    let book = catalog
        .find_mut(book, isbn)
        .ok_or(AppError::BookNotFound { isbn })?;
    let copy = book
        .first_loaned_mut()
        .ok_or(AppError::NoLoanedCopy { isbn })?;

    copy.due_date = copy.due_date.extended();

    Ok(Receipt {
        transition: Transition::Renew,
        isbn,
        copy: copy.number,
        due_date: copy.due_date,
    })
}

/// Apply any catalog-changing request
pub fn apply(catalog: &mut Catalog, request: &Request, today: DueDate) -> AppResult<Receipt> {
    match request.operation {
        Operation::Loan => lend(catalog, &request.book, request.isbn, today),
        Operation::Return => give_back(catalog, &request.book, request.isbn),
        Operation::Renew => renew(catalog, &request.book, request.isbn),
        Operation::Quit => Err(AppError::Internal(
            "quit requests do not touch the catalog".to_string(),
        )),
    }
}
