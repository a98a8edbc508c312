mod borrowed_at;
mod id;
mod returned_at;
mod score;

pub use self::{borrowed_at::*, id::*, returned_at::*, score::*};
use destructure::Destructure;
use serde::{Deserialize, Serialize};
use vodca::References;

use crate::entity::{BookId, UserId};

/// One ledger entry. A record without `returned_at` is an in-progress loan
/// ("open"); closing it sets `returned_at` and `score` together. Records are
/// never deleted.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, References, Destructure)]
pub struct BorrowRecord {
    id: RecordId,
    user_id: UserId,
    book_id: BookId,
    borrowed_at: BorrowedAt,
    returned_at: Option<ReturnedAt>,
    score: Option<Score>,
}

impl BorrowRecord {
    pub fn new(
        id: RecordId,
        user_id: UserId,
        book_id: BookId,
        borrowed_at: BorrowedAt,
        returned_at: Option<ReturnedAt>,
        score: Option<Score>,
    ) -> Self {
        Self {
            id,
            user_id,
            book_id,
            borrowed_at,
            returned_at,
            score,
        }
    }

    /// Fresh open record for a borrow that is committing now.
    pub fn open(id: RecordId, user_id: UserId, book_id: BookId, borrowed_at: BorrowedAt) -> Self {
        Self::new(id, user_id, book_id, borrowed_at, None, None)
    }

    pub fn close(self, returned_at: ReturnedAt, score: Score) -> Self {
        self.reconstruct(|record| {
            record.returned_at = Some(returned_at);
            record.score = Some(score);
        })
    }

    pub fn is_open(&self) -> bool {
        self.returned_at.is_none()
    }
}
