use error_stack::Report;
use sqlx::types::Uuid;
use sqlx::PgConnection;
use time::OffsetDateTime;

use kernel::interface::query::LedgerQuery;
use kernel::interface::update::LedgerModifier;
use kernel::prelude::entity::{
    BookId, BorrowRecord, BorrowedAt, RecordId, ReturnedAt, Score, UserId,
};
use kernel::KernelError;

use crate::database::postgres::PostgresConnection;
use crate::error::ConvertError;

pub struct PostgresLedgerRepository;

#[async_trait::async_trait]
impl LedgerQuery<PostgresConnection> for PostgresLedgerRepository {
    async fn find_open_record(
        &self,
        con: &mut PostgresConnection,
        user_id: &UserId,
        book_id: &BookId,
    ) -> error_stack::Result<Option<BorrowRecord>, KernelError> {
        PgLedgerInternal::find_open_record(con.raw(), user_id, book_id).await
    }

    async fn find_by_user_id(
        &self,
        con: &mut PostgresConnection,
        user_id: &UserId,
    ) -> error_stack::Result<Vec<BorrowRecord>, KernelError> {
        PgLedgerInternal::find_by_user_id(con.raw(), user_id).await
    }

    async fn find_by_book_id(
        &self,
        con: &mut PostgresConnection,
        book_id: &BookId,
    ) -> error_stack::Result<Vec<BorrowRecord>, KernelError> {
        PgLedgerInternal::find_by_book_id(con.raw(), book_id).await
    }
}

#[async_trait::async_trait]
impl LedgerModifier<PostgresConnection> for PostgresLedgerRepository {
    async fn create(
        &self,
        con: &mut PostgresConnection,
        record: &BorrowRecord,
    ) -> error_stack::Result<(), KernelError> {
        PgLedgerInternal::create(con.raw(), record).await
    }

    async fn update(
        &self,
        con: &mut PostgresConnection,
        record: &BorrowRecord,
    ) -> error_stack::Result<(), KernelError> {
        PgLedgerInternal::update(con.raw(), record).await
    }
}

#[derive(sqlx::FromRow)]
struct BorrowRecordRow {
    id: Uuid,
    user_id: Uuid,
    book_id: Uuid,
    borrowed_at: OffsetDateTime,
    returned_at: Option<OffsetDateTime>,
    score: Option<i16>,
}

impl TryFrom<BorrowRecordRow> for BorrowRecord {
    type Error = Report<KernelError>;

    fn try_from(row: BorrowRecordRow) -> Result<Self, Self::Error> {
        Ok(BorrowRecord::new(
            RecordId::new(row.id),
            UserId::new(row.user_id),
            BookId::new(row.book_id),
            BorrowedAt::new(row.borrowed_at),
            row.returned_at.map(ReturnedAt::new),
            row.score.map(Score::try_from).transpose()?,
        ))
    }
}

pub(in crate::database) struct PgLedgerInternal;

impl PgLedgerInternal {
    /// `seq` is a serial column; ordering on it after `borrowed_at` makes
    /// the latest insertion win when timestamps tie.
    async fn find_open_record(
        con: &mut PgConnection,
        user_id: &UserId,
        book_id: &BookId,
    ) -> error_stack::Result<Option<BorrowRecord>, KernelError> {
        let row = sqlx::query_as::<_, BorrowRecordRow>(
            // language=postgresql
            r#"
            SELECT id, user_id, book_id, borrowed_at, returned_at, score
            FROM borrow_records
            WHERE user_id = $1 AND book_id = $2 AND returned_at IS NULL
            ORDER BY borrowed_at DESC, seq DESC
            LIMIT 1
            "#,
        )
        .bind(user_id.as_ref())
        .bind(book_id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        row.map(BorrowRecord::try_from).transpose()
    }

    async fn find_by_user_id(
        con: &mut PgConnection,
        user_id: &UserId,
    ) -> error_stack::Result<Vec<BorrowRecord>, KernelError> {
        let rows = sqlx::query_as::<_, BorrowRecordRow>(
            // language=postgresql
            r#"
            SELECT id, user_id, book_id, borrowed_at, returned_at, score
            FROM borrow_records
            WHERE user_id = $1
            ORDER BY borrowed_at ASC, seq ASC
            "#,
        )
        .bind(user_id.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        rows.into_iter().map(BorrowRecord::try_from).collect()
    }

    async fn find_by_book_id(
        con: &mut PgConnection,
        book_id: &BookId,
    ) -> error_stack::Result<Vec<BorrowRecord>, KernelError> {
        let rows = sqlx::query_as::<_, BorrowRecordRow>(
            // language=postgresql
            r#"
            SELECT id, user_id, book_id, borrowed_at, returned_at, score
            FROM borrow_records
            WHERE book_id = $1
            ORDER BY borrowed_at ASC, seq ASC
            "#,
        )
        .bind(book_id.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        rows.into_iter().map(BorrowRecord::try_from).collect()
    }

    async fn create(
        con: &mut PgConnection,
        record: &BorrowRecord,
    ) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO borrow_records (id, user_id, book_id, borrowed_at, returned_at, score)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id().as_ref())
        .bind(record.user_id().as_ref())
        .bind(record.book_id().as_ref())
        .bind(record.borrowed_at().as_ref())
        .bind(record.returned_at().as_ref().map(|at| *at.as_ref()))
        .bind(record.score().as_ref().map(|score| *score.as_ref()))
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn update(
        con: &mut PgConnection,
        record: &BorrowRecord,
    ) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            UPDATE borrow_records
            SET returned_at = $2, score = $3
            WHERE id = $1
            "#,
        )
        .bind(record.id().as_ref())
        .bind(record.returned_at().as_ref().map(|at| *at.as_ref()))
        .bind(record.score().as_ref().map(|score| *score.as_ref()))
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }
}
