use std::fmt::Display;

use error_stack::Context;

/// Failure taxonomy of the lending engine.
///
/// The first five variants are the typed outcomes the coordinator reports to
/// its caller; `Timeout` and `Internal` cover the infrastructure underneath.
#[derive(Debug)]
pub enum KernelError {
    UserNotFound,
    BookNotFound,
    AlreadyBorrowed,
    NotBorrowedByUser,
    InvalidScore(String),
    Timeout,
    Internal,
}

impl Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelError::UserNotFound => write!(f, "User not found"),
            KernelError::BookNotFound => write!(f, "Book not found"),
            KernelError::AlreadyBorrowed => {
                write!(f, "This book is currently borrowed by another user")
            }
            KernelError::NotBorrowedByUser => write!(
                f,
                "This book has not been borrowed by the user or has already been returned"
            ),
            KernelError::InvalidScore(detail) => write!(f, "Invalid score: {detail}"),
            KernelError::Timeout => write!(f, "Process timed out"),
            KernelError::Internal => write!(f, "Internal kernel error"),
        }
    }
}

impl Context for KernelError {}
