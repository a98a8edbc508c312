use sqlx::types::Uuid;
use sqlx::PgConnection;

use kernel::interface::query::BookQuery;
use kernel::interface::update::BookModifier;
use kernel::prelude::entity::{Book, BookId, BookTitle};
use kernel::KernelError;

use crate::database::postgres::PostgresConnection;
use crate::error::ConvertError;

pub struct PostgresBookRepository;

#[async_trait::async_trait]
impl BookQuery<PostgresConnection> for PostgresBookRepository {
    async fn find_by_id(
        &self,
        con: &mut PostgresConnection,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        PgBookInternal::find_by_id(con.raw(), id).await
    }
}

#[async_trait::async_trait]
impl BookModifier<PostgresConnection> for PostgresBookRepository {
    async fn create(
        &self,
        con: &mut PostgresConnection,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        PgBookInternal::create(con.raw(), book).await
    }
}

#[derive(sqlx::FromRow)]
struct BookRow {
    id: Uuid,
    title: String,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book::new(BookId::new(row.id), BookTitle::new(row.title))
    }
}

pub(in crate::database) struct PgBookInternal;

impl PgBookInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        let row = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT id, title
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Book::from))
    }

    async fn create(con: &mut PgConnection, book: &Book) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO books (id, title)
            VALUES ($1, $2)
            "#,
        )
        .bind(book.id().as_ref())
        .bind(book.title().as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }
}
