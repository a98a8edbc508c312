use time::OffsetDateTime;
use uuid::Uuid;

use kernel::prelude::entity::{BorrowRecord, DestructBorrowRecord};

pub struct BorrowBookDto {
    pub user_id: Uuid,
    pub book_id: Uuid,
}

pub struct ReturnBookDto {
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub score: i16,
}

pub struct GetLoanHistoryDto {
    pub user_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct BorrowRecordDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub borrowed_at: OffsetDateTime,
    pub returned_at: Option<OffsetDateTime>,
    pub score: Option<i16>,
}

impl From<BorrowRecord> for BorrowRecordDto {
    fn from(record: BorrowRecord) -> Self {
        let DestructBorrowRecord {
            id,
            user_id,
            book_id,
            borrowed_at,
            returned_at,
            score,
        } = record.into_destruct();
        Self {
            id: *id.as_ref(),
            user_id: *user_id.as_ref(),
            book_id: *book_id.as_ref(),
            borrowed_at: *borrowed_at.as_ref(),
            returned_at: returned_at.map(|at| *at.as_ref()),
            score: score.map(|score| *score.as_ref()),
        }
    }
}
