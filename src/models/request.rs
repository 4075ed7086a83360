//! Loan requests and their outcomes

use std::fmt;

use super::due_date::DueDate;

/// Operation carried by a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `P`: borrow a copy
    Loan,
    /// `D`: give a copy back
    Return,
    /// `R`: extend a loan
    Renew,
    /// `Q`: stop the server
    Quit,
}

impl Operation {
    pub fn code(self) -> char {
        match self {
            Operation::Loan => 'P',
            Operation::Return => 'D',
            Operation::Renew => 'R',
            Operation::Quit => 'Q',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'P' => Some(Operation::Loan),
            'D' => Some(Operation::Return),
            'R' => Some(Operation::Renew),
            'Q' => Some(Operation::Quit),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Operation::Loan => "loan",
            Operation::Return => "return",
            Operation::Renew => "renew",
            Operation::Quit => "quit",
        };
        write!(f, "{}", label)
    }
}

/// A request as received from a requester
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub operation: Operation,
    pub book: String,
    pub isbn: u32,
    /// Routes the reply to the requester's private channel
    pub requester: u32,
}

impl Request {
    pub fn new(operation: Operation, book: impl Into<String>, isbn: u32, requester: u32) -> Self {
        Self {
            operation,
            book: book.into(),
            isbn,
            requester,
        }
    }

    /// Marker handed to consumers once the server is shutting down
    pub fn quit_sentinel() -> Self {
        Self::new(Operation::Quit, "", 0, 0)
    }

    pub fn is_quit(&self) -> bool {
        self.operation == Operation::Quit
    }
}

/// Catalog change a receipt reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Loan,
    Return,
    Renew,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Transition::Loan => "loan",
            Transition::Return => "return",
            Transition::Renew => "renew",
        };
        write!(f, "{}", label)
    }
}

/// Successful outcome of a catalog transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transition: Transition,
    pub isbn: u32,
    pub copy: u32,
    pub due_date: DueDate,
}

impl Receipt {
    /// Text sent back to the requester
    pub fn reply_text(&self) -> String {
        match self.transition {
            Transition::Loan => format!(
                "Loan granted: ISBN {}, copy {}, due {}",
                self.isbn, self.copy, self.due_date
            ),
            Transition::Return => format!("Return accepted: ISBN {}, copy {}", self.isbn, self.copy),
            Transition::Renew => format!(
                "Renewal accepted: ISBN {}, copy {}, due {}",
                self.isbn, self.copy, self.due_date
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_codes() {
        for op in [Operation::Loan, Operation::Return, Operation::Renew, Operation::Quit] {
            assert_eq!(Operation::from_code(op.code()), Some(op));
        }
        assert_eq!(Operation::from_code('X'), None);
    }

    #[test]
    fn test_receipt_text() {
        let receipt = Receipt {
            transition: Transition::Loan,
            isbn: 100,
            copy: 1,
            due_date: DueDate::new(5, 4, 2025),
        };
        assert_eq!(receipt.reply_text(), "Loan granted: ISBN 100, copy 1, due 05-04-2025");
    }
}
