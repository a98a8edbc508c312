use crate::database::Transaction;
use crate::entity::{BookId, CurrentBorrow, UserId};
use crate::KernelError;

/// Write side of the InventoryTracker.
#[async_trait::async_trait]
pub trait InventoryModifier<Connection: Transaction>: 'static + Sync + Send {
    /// Inserts the current-holder row. Must fail with
    /// `KernelError::AlreadyBorrowed` when a row for the book already
    /// exists, atomically with the insert itself. Against a racing borrow
    /// of the same book, exactly one caller succeeds.
    async fn mark_borrowed(
        &self,
        con: &mut Connection,
        borrow: &CurrentBorrow,
    ) -> error_stack::Result<(), KernelError>;

    /// Deletes the row matching both ids. Returns `false` when no such row
    /// exists, i.e. the book is not held by this user.
    async fn mark_returned(
        &self,
        con: &mut Connection,
        user_id: &UserId,
        book_id: &BookId,
    ) -> error_stack::Result<bool, KernelError>;
}

pub trait DependOnInventoryModifier<Connection: Transaction>: 'static + Sync + Send {
    type InventoryModifier: InventoryModifier<Connection>;
    fn inventory_modifier(&self) -> &Self::InventoryModifier;
}
