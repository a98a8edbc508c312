use crate::database::Transaction;
use crate::entity::Book;
use crate::KernelError;

#[async_trait::async_trait]
pub trait BookModifier<Connection: Transaction>: 'static + Sync + Send {
    async fn create(
        &self,
        con: &mut Connection,
        book: &Book,
    ) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnBookModifier<Connection: Transaction>: 'static + Sync + Send {
    type BookModifier: BookModifier<Connection>;
    fn book_modifier(&self) -> &Self::BookModifier;
}
