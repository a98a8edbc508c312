use error_stack::Report;
use sqlx::types::Uuid;
use sqlx::{Error, PgConnection};

use kernel::interface::query::InventoryQuery;
use kernel::interface::update::InventoryModifier;
use kernel::prelude::entity::{BookId, CurrentBorrow, UserId};
use kernel::KernelError;

use crate::database::postgres::PostgresConnection;
use crate::error::ConvertError;

pub struct PostgresInventoryRepository;

#[async_trait::async_trait]
impl InventoryQuery<PostgresConnection> for PostgresInventoryRepository {
    async fn find_by_book_id(
        &self,
        con: &mut PostgresConnection,
        book_id: &BookId,
    ) -> error_stack::Result<Option<CurrentBorrow>, KernelError> {
        PgInventoryInternal::find_by_book_id(con.raw(), book_id).await
    }

    async fn find_by_user_id(
        &self,
        con: &mut PostgresConnection,
        user_id: &UserId,
    ) -> error_stack::Result<Vec<CurrentBorrow>, KernelError> {
        PgInventoryInternal::find_by_user_id(con.raw(), user_id).await
    }
}

#[async_trait::async_trait]
impl InventoryModifier<PostgresConnection> for PostgresInventoryRepository {
    async fn mark_borrowed(
        &self,
        con: &mut PostgresConnection,
        borrow: &CurrentBorrow,
    ) -> error_stack::Result<(), KernelError> {
        PgInventoryInternal::mark_borrowed(con.raw(), borrow).await
    }

    async fn mark_returned(
        &self,
        con: &mut PostgresConnection,
        user_id: &UserId,
        book_id: &BookId,
    ) -> error_stack::Result<bool, KernelError> {
        PgInventoryInternal::mark_returned(con.raw(), user_id, book_id).await
    }
}

#[derive(sqlx::FromRow)]
struct CurrentBorrowRow {
    book_id: Uuid,
    user_id: Uuid,
}

impl From<CurrentBorrowRow> for CurrentBorrow {
    fn from(row: CurrentBorrowRow) -> Self {
        CurrentBorrow::new(BookId::new(row.book_id), UserId::new(row.user_id))
    }
}

pub(in crate::database) struct PgInventoryInternal;

impl PgInventoryInternal {
    async fn find_by_book_id(
        con: &mut PgConnection,
        book_id: &BookId,
    ) -> error_stack::Result<Option<CurrentBorrow>, KernelError> {
        let row = sqlx::query_as::<_, CurrentBorrowRow>(
            // language=postgresql
            r#"
            SELECT book_id, user_id
            FROM current_borrows
            WHERE book_id = $1
            "#,
        )
        .bind(book_id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(CurrentBorrow::from))
    }

    async fn find_by_user_id(
        con: &mut PgConnection,
        user_id: &UserId,
    ) -> error_stack::Result<Vec<CurrentBorrow>, KernelError> {
        let rows = sqlx::query_as::<_, CurrentBorrowRow>(
            // language=postgresql
            r#"
            SELECT book_id, user_id
            FROM current_borrows
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(CurrentBorrow::from).collect())
    }

    /// The unique index on `book_id` is what decides a race between two
    /// concurrent borrows; the losing insert surfaces as `AlreadyBorrowed`.
    async fn mark_borrowed(
        con: &mut PgConnection,
        borrow: &CurrentBorrow,
    ) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO current_borrows (book_id, user_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(borrow.book_id().as_ref())
        .bind(borrow.user_id().as_ref())
        .execute(con)
        .await
        .map_err(|error| {
            let conflict = matches!(&error, Error::Database(e) if e.is_unique_violation());
            if conflict {
                Report::from(error).change_context(KernelError::AlreadyBorrowed)
            } else {
                Report::from(error).change_context(KernelError::Internal)
            }
        })?;
        Ok(())
    }

    async fn mark_returned(
        con: &mut PgConnection,
        user_id: &UserId,
        book_id: &BookId,
    ) -> error_stack::Result<bool, KernelError> {
        let result = sqlx::query(
            // language=postgresql
            r#"
            DELETE FROM current_borrows
            WHERE book_id = $1 AND user_id = $2
            "#,
        )
        .bind(book_id.as_ref())
        .bind(user_id.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod test {
    use uuid::Uuid;

    use kernel::interface::database::{DatabaseConnection, Transaction};
    use kernel::interface::query::InventoryQuery;
    use kernel::interface::update::{BookModifier, InventoryModifier, UserModifier};
    use kernel::prelude::entity::{
        Book, BookId, BookTitle, CurrentBorrow, User, UserId, UserName,
    };
    use kernel::KernelError;

    use crate::database::postgres::{
        PostgresBookRepository, PostgresDatabase, PostgresInventoryRepository,
        PostgresUserRepository,
    };

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn second_mark_borrowed_conflicts() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        db.migrate().await?;
        let mut connection = db.transact().await?;

        let user_id = UserId::new(Uuid::new_v4());
        let other_id = UserId::new(Uuid::new_v4());
        let book_id = BookId::new(Uuid::new_v4());
        PostgresUserRepository
            .create(
                &mut connection,
                &User::new(user_id.clone(), UserName::new("holder")),
            )
            .await?;
        PostgresUserRepository
            .create(
                &mut connection,
                &User::new(other_id.clone(), UserName::new("latecomer")),
            )
            .await?;
        PostgresBookRepository
            .create(
                &mut connection,
                &Book::new(book_id.clone(), BookTitle::new("title")),
            )
            .await?;

        let borrow = CurrentBorrow::new(book_id.clone(), user_id.clone());
        PostgresInventoryRepository
            .mark_borrowed(&mut connection, &borrow)
            .await?;

        let found = PostgresInventoryRepository
            .find_by_book_id(&mut connection, &book_id)
            .await?;
        assert_eq!(found, Some(borrow));

        let conflict = PostgresInventoryRepository
            .mark_borrowed(
                &mut connection,
                &CurrentBorrow::new(book_id.clone(), other_id),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            conflict.current_context(),
            KernelError::AlreadyBorrowed
        ));

        connection.roll_back().await?;
        Ok(())
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn mark_returned_reports_missing_row() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        db.migrate().await?;
        let mut connection = db.transact().await?;

        let user_id = UserId::new(Uuid::new_v4());
        let book_id = BookId::new(Uuid::new_v4());
        PostgresUserRepository
            .create(
                &mut connection,
                &User::new(user_id.clone(), UserName::new("reader")),
            )
            .await?;
        PostgresBookRepository
            .create(
                &mut connection,
                &Book::new(book_id.clone(), BookTitle::new("title")),
            )
            .await?;

        let missing = PostgresInventoryRepository
            .mark_returned(&mut connection, &user_id, &book_id)
            .await?;
        assert!(!missing);

        PostgresInventoryRepository
            .mark_borrowed(
                &mut connection,
                &CurrentBorrow::new(book_id.clone(), user_id.clone()),
            )
            .await?;
        let deleted = PostgresInventoryRepository
            .mark_returned(&mut connection, &user_id, &book_id)
            .await?;
        assert!(deleted);

        connection.roll_back().await?;
        Ok(())
    }
}
