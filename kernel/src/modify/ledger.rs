use crate::database::Transaction;
use crate::entity::BorrowRecord;
use crate::KernelError;

/// Write side of the LendingLedger. Append and close only; history is
/// never deleted.
#[async_trait::async_trait]
pub trait LedgerModifier<Connection: Transaction>: 'static + Sync + Send {
    async fn create(
        &self,
        con: &mut Connection,
        record: &BorrowRecord,
    ) -> error_stack::Result<(), KernelError>;

    /// Rewrites the record identified by `record.id()`, used to close an
    /// open record with its `returned_at` and `score`.
    async fn update(
        &self,
        con: &mut Connection,
        record: &BorrowRecord,
    ) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnLedgerModifier<Connection: Transaction>: 'static + Sync + Send {
    type LedgerModifier: LedgerModifier<Connection>;
    fn ledger_modifier(&self) -> &Self::LedgerModifier;
}
