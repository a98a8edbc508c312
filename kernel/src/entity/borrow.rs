use destructure::Destructure;
use serde::{Deserialize, Serialize};
use vodca::References;

use crate::entity::{BookId, UserId};

/// Current-holder relation. At most one row may exist per book system-wide;
/// the backing store enforces this with a uniqueness constraint on the book
/// so that check-then-insert races lose with a conflict, never a double hold.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, References, Destructure)]
pub struct CurrentBorrow {
    book_id: BookId,
    user_id: UserId,
}

impl CurrentBorrow {
    pub fn new(book_id: BookId, user_id: UserId) -> Self {
        Self { book_id, user_id }
    }
}
