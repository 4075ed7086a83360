//! Copy (physical instance of a book) model and related types

use std::fmt;

use super::due_date::DueDate;

/// Copy loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStatus {
    /// On the shelf (`D` in the catalog file)
    Available,
    /// Lent out (`P` in the catalog file)
    Loaned,
}

impl CopyStatus {
    pub fn code(self) -> char {
        match self {
            CopyStatus::Available => 'D',
            CopyStatus::Loaned => 'P',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'D' => Some(CopyStatus::Available),
            'P' => Some(CopyStatus::Loaned),
            _ => None,
        }
    }
}

impl fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single copy of a book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookCopy {
    pub number: u32,
    pub status: CopyStatus,
    pub due_date: DueDate,
}

impl BookCopy {
    pub fn new(number: u32, status: CopyStatus, due_date: DueDate) -> Self {
        Self {
            number,
            status,
            due_date,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == CopyStatus::Available
    }

    pub fn is_loaned(&self) -> bool {
        self.status == CopyStatus::Loaned
    }
}
