use uuid::Uuid;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::update::{BookModifier, DependOnBookModifier};
use kernel::prelude::entity::{Book, BookId, BookTitle};
use kernel::KernelError;

use crate::transfer::CreateBookDto;

#[async_trait::async_trait]
pub trait CreateBookService<Connection: Transaction + Send>:
    'static + Sync + Send + DependOnDatabaseConnection<Connection> + DependOnBookModifier<Connection>
{
    async fn create_book(&self, dto: CreateBookDto) -> error_stack::Result<Uuid, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let uuid = Uuid::new_v4();
        let book = Book::new(BookId::new(uuid), BookTitle::new(dto.title));
        match self.book_modifier().create(&mut connection, &book).await {
            Ok(()) => {
                connection.commit().await?;
                Ok(uuid)
            }
            Err(report) => {
                connection.roll_back().await?;
                Err(report)
            }
        }
    }
}

impl<Connection: Transaction + Send, T> CreateBookService<Connection> for T where
    T: DependOnDatabaseConnection<Connection> + DependOnBookModifier<Connection>
{
}
