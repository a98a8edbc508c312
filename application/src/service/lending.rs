use error_stack::Report;
use time::OffsetDateTime;
use uuid::Uuid;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::policy::DependOnReturnPolicy;
use kernel::interface::query::{
    BookQuery, DependOnBookQuery, DependOnInventoryQuery, DependOnLedgerQuery, DependOnUserQuery,
    InventoryQuery, LedgerQuery, UserQuery,
};
use kernel::interface::update::{
    DependOnInventoryModifier, DependOnLedgerModifier, InventoryModifier, LedgerModifier,
};
use kernel::prelude::entity::{
    BookId, BorrowRecord, BorrowedAt, CurrentBorrow, RecordId, ReturnedAt, Score, UserId,
};
use kernel::KernelError;

use crate::transfer::{BorrowBookDto, BorrowRecordDto, GetLoanHistoryDto, ReturnBookDto};

/// Lends a book to a user: one transaction covering the existence checks,
/// the current-holder insert and the open ledger record. Every failure path
/// rolls the whole unit back.
#[async_trait::async_trait]
pub trait BorrowBookService<Connection: Transaction + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnUserQuery<Connection>
    + DependOnBookQuery<Connection>
    + DependOnInventoryQuery<Connection>
    + DependOnInventoryModifier<Connection>
    + DependOnLedgerModifier<Connection>
{
    async fn borrow_book(&self, dto: BorrowBookDto) -> error_stack::Result<(), KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let user_id = UserId::new(dto.user_id);
        let book_id = BookId::new(dto.book_id);

        let steps = async {
            self.user_query()
                .find_by_id(&mut connection, &user_id)
                .await?
                .ok_or_else(|| Report::new(KernelError::UserNotFound))?;
            self.book_query()
                .find_by_id(&mut connection, &book_id)
                .await?
                .ok_or_else(|| Report::new(KernelError::BookNotFound))?;

            let held = self
                .inventory_query()
                .find_by_book_id(&mut connection, &book_id)
                .await?;
            if held.is_some() {
                return Err(Report::new(KernelError::AlreadyBorrowed));
            }

            // The store's uniqueness constraint on the book backs this up:
            // of two racing borrows, one insert fails as AlreadyBorrowed.
            let borrow = CurrentBorrow::new(book_id.clone(), user_id.clone());
            self.inventory_modifier()
                .mark_borrowed(&mut connection, &borrow)
                .await?;

            let record = BorrowRecord::open(
                RecordId::new(Uuid::new_v4()),
                user_id.clone(),
                book_id.clone(),
                BorrowedAt::new(OffsetDateTime::now_utc()),
            );
            self.ledger_modifier()
                .create(&mut connection, &record)
                .await?;

            Ok::<(), Report<KernelError>>(())
        }
        .await;

        match steps {
            Ok(()) => connection.commit().await,
            Err(report) => {
                tracing::debug!("borrow rolled back: {report:?}");
                connection.roll_back().await?;
                Err(report)
            }
        }
    }
}

impl<Connection: Transaction + Send, T> BorrowBookService<Connection> for T where
    T: DependOnDatabaseConnection<Connection>
        + DependOnUserQuery<Connection>
        + DependOnBookQuery<Connection>
        + DependOnInventoryQuery<Connection>
        + DependOnInventoryModifier<Connection>
        + DependOnLedgerModifier<Connection>
{
}

/// Takes a book back and closes the matching open ledger record with the
/// user's score. The score is validated before any state is touched; the
/// transaction is still rolled back on that path.
#[async_trait::async_trait]
pub trait ReturnBookService<Connection: Transaction + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnUserQuery<Connection>
    + DependOnBookQuery<Connection>
    + DependOnInventoryQuery<Connection>
    + DependOnInventoryModifier<Connection>
    + DependOnLedgerQuery<Connection>
    + DependOnLedgerModifier<Connection>
    + DependOnReturnPolicy
{
    async fn return_book(&self, dto: ReturnBookDto) -> error_stack::Result<(), KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let steps = async {
            let score = Score::try_from(dto.score)?;
            let user_id = UserId::new(dto.user_id);
            let book_id = BookId::new(dto.book_id);

            self.user_query()
                .find_by_id(&mut connection, &user_id)
                .await?
                .ok_or_else(|| Report::new(KernelError::UserNotFound))?;
            self.book_query()
                .find_by_id(&mut connection, &book_id)
                .await?
                .ok_or_else(|| Report::new(KernelError::BookNotFound))?;

            let holder = self
                .inventory_query()
                .find_by_book_id(&mut connection, &book_id)
                .await?;
            match holder {
                Some(borrow) if borrow.user_id() == &user_id => {}
                _ => return Err(Report::new(KernelError::NotBorrowedByUser)),
            }

            let deleted = self
                .inventory_modifier()
                .mark_returned(&mut connection, &user_id, &book_id)
                .await?;
            if !deleted {
                return Err(Report::new(KernelError::NotBorrowedByUser));
            }

            let now = OffsetDateTime::now_utc();
            let open = self
                .ledger_query()
                .find_open_record(&mut connection, &user_id, &book_id)
                .await?;
            match open {
                Some(record) => {
                    let closed = record.close(ReturnedAt::new(now), score);
                    self.ledger_modifier()
                        .update(&mut connection, &closed)
                        .await?;
                }
                None if self.return_policy().backfill_missing_record => {
                    // Loan was held in inventory but never reached the
                    // ledger; synthesize an already-closed record so the
                    // return still leaves a trace.
                    tracing::warn!(
                        "no open ledger record for user/book pair, backfilling a closed one"
                    );
                    let record = BorrowRecord::new(
                        RecordId::new(Uuid::new_v4()),
                        user_id.clone(),
                        book_id.clone(),
                        BorrowedAt::new(now),
                        Some(ReturnedAt::new(now)),
                        Some(score),
                    );
                    self.ledger_modifier()
                        .create(&mut connection, &record)
                        .await?;
                }
                None => {
                    return Err(Report::new(KernelError::Internal).attach_printable(
                        "inventory row existed without an open ledger record",
                    ));
                }
            }

            Ok::<(), Report<KernelError>>(())
        }
        .await;

        match steps {
            Ok(()) => connection.commit().await,
            Err(report) => {
                tracing::debug!("return rolled back: {report:?}");
                connection.roll_back().await?;
                Err(report)
            }
        }
    }
}

impl<Connection: Transaction + Send, T> ReturnBookService<Connection> for T where
    T: DependOnDatabaseConnection<Connection>
        + DependOnUserQuery<Connection>
        + DependOnBookQuery<Connection>
        + DependOnInventoryQuery<Connection>
        + DependOnInventoryModifier<Connection>
        + DependOnLedgerQuery<Connection>
        + DependOnLedgerModifier<Connection>
        + DependOnReturnPolicy
{
}

#[async_trait::async_trait]
pub trait GetLoanHistoryService<Connection: Transaction + Send>:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection<Connection>
    + DependOnUserQuery<Connection>
    + DependOnLedgerQuery<Connection>
{
    async fn get_loan_history(
        &self,
        dto: GetLoanHistoryDto,
    ) -> error_stack::Result<Vec<BorrowRecordDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let user_id = UserId::new(dto.user_id);
        let records = async {
            self.user_query()
                .find_by_id(&mut connection, &user_id)
                .await?
                .ok_or_else(|| Report::new(KernelError::UserNotFound))?;
            self.ledger_query()
                .find_by_user_id(&mut connection, &user_id)
                .await
        }
        .await;
        match records {
            Ok(records) => {
                connection.commit().await?;
                Ok(records.into_iter().map(BorrowRecordDto::from).collect())
            }
            Err(report) => {
                connection.roll_back().await?;
                Err(report)
            }
        }
    }
}

impl<Connection: Transaction + Send, T> GetLoanHistoryService<Connection> for T where
    T: DependOnDatabaseConnection<Connection>
        + DependOnUserQuery<Connection>
        + DependOnLedgerQuery<Connection>
{
}
