use crate::database::Transaction;
use crate::entity::{BookId, BorrowRecord, UserId};
use crate::KernelError;

/// Read side of the LendingLedger.
#[async_trait::async_trait]
pub trait LedgerQuery<Connection: Transaction>: Sync + Send + 'static {
    /// Most recent open record for the pair, by `borrowed_at` descending.
    /// Ties are broken by insertion order, latest insertion first.
    async fn find_open_record(
        &self,
        con: &mut Connection,
        user_id: &UserId,
        book_id: &BookId,
    ) -> error_stack::Result<Option<BorrowRecord>, KernelError>;

    async fn find_by_user_id(
        &self,
        con: &mut Connection,
        user_id: &UserId,
    ) -> error_stack::Result<Vec<BorrowRecord>, KernelError>;

    async fn find_by_book_id(
        &self,
        con: &mut Connection,
        book_id: &BookId,
    ) -> error_stack::Result<Vec<BorrowRecord>, KernelError>;
}

pub trait DependOnLedgerQuery<Connection: Transaction>: Sync + Send + 'static {
    type LedgerQuery: LedgerQuery<Connection>;
    fn ledger_query(&self) -> &Self::LedgerQuery;
}
