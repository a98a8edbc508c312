use crate::KernelError;

/// Source of transactional scopes. Only the coordinating service layer is
/// supposed to call `transact`; repositories receive the opened transaction
/// as an explicit `&mut` parameter and never open their own.
#[async_trait::async_trait]
pub trait DatabaseConnection<Connection: Transaction>: 'static + Sync + Send {
    async fn transact(&self) -> error_stack::Result<Connection, KernelError>;
}

pub trait DependOnDatabaseConnection<Connection: Transaction>: 'static + Sync + Send {
    type DatabaseConnection: DatabaseConnection<Connection>;
    fn database_connection(&self) -> &Self::DatabaseConnection;
}

impl<Connection: Transaction, T> DependOnDatabaseConnection<Connection> for T
where
    T: DatabaseConnection<Connection>,
{
    type DatabaseConnection = T;
    fn database_connection(&self) -> &Self::DatabaseConnection {
        self
    }
}

/// One atomic unit of work. Dropping an implementation without calling
/// either method must be equivalent to `roll_back`.
#[async_trait::async_trait]
pub trait Transaction: 'static + Sync + Send {
    async fn commit(self) -> error_stack::Result<(), KernelError>;
    async fn roll_back(self) -> error_stack::Result<(), KernelError>;
}
