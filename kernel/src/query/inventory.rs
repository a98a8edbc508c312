use crate::database::Transaction;
use crate::entity::{BookId, CurrentBorrow, UserId};
use crate::KernelError;

/// Read side of the InventoryTracker: who currently holds what.
#[async_trait::async_trait]
pub trait InventoryQuery<Connection: Transaction>: Sync + Send + 'static {
    /// Current holder of the book, if any. `Some` means the book is borrowed.
    async fn find_by_book_id(
        &self,
        con: &mut Connection,
        book_id: &BookId,
    ) -> error_stack::Result<Option<CurrentBorrow>, KernelError>;

    async fn find_by_user_id(
        &self,
        con: &mut Connection,
        user_id: &UserId,
    ) -> error_stack::Result<Vec<CurrentBorrow>, KernelError>;
}

pub trait DependOnInventoryQuery<Connection: Transaction>: Sync + Send + 'static {
    type InventoryQuery: InventoryQuery<Connection>;
    fn inventory_query(&self) -> &Self::InventoryQuery;
}
