use error_stack::Report;
use sqlx::{Error, PgConnection, Pool, Postgres};

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::interface::policy::{DependOnReturnPolicy, ReturnPolicy};
use kernel::interface::query::{
    DependOnBookQuery, DependOnInventoryQuery, DependOnLedgerQuery, DependOnUserQuery,
};
use kernel::interface::update::{
    DependOnBookModifier, DependOnInventoryModifier, DependOnLedgerModifier, DependOnUserModifier,
};
use kernel::KernelError;

use crate::env;
use crate::error::ConvertError;

pub use self::{book::*, inventory::*, ledger::*, user::*};

mod book;
mod inventory;
mod ledger;
mod user;

static POSTGRES_URL: &str = "POSTGRES_URL";

pub struct PostgresDatabase {
    pool: Pool<Postgres>,
    return_policy: ReturnPolicy,
}

impl PostgresDatabase {
    pub async fn new() -> error_stack::Result<Self, KernelError> {
        let url = env(POSTGRES_URL)?;
        let pool = Pool::connect(&url).await.convert_error()?;
        tracing::debug!("postgres pool established");
        Ok(Self {
            pool,
            return_policy: ReturnPolicy::default(),
        })
    }

    pub fn with_return_policy(mut self, policy: ReturnPolicy) -> Self {
        self.return_policy = policy;
        self
    }

    pub async fn migrate(&self) -> error_stack::Result<(), KernelError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|error| Report::from(error).change_context(KernelError::Internal))?;
        Ok(())
    }
}

/// One open Postgres transaction. Dropping the wrapper without committing
/// rolls the transaction back (sqlx semantics), so an abandoned request can
/// never leave a partial commit behind.
pub struct PostgresConnection(sqlx::Transaction<'static, Postgres>);

impl PostgresConnection {
    pub(in crate::database) fn raw(&mut self) -> &mut PgConnection {
        &mut self.0
    }
}

#[async_trait::async_trait]
impl DatabaseConnection<PostgresConnection> for PostgresDatabase {
    async fn transact(&self) -> error_stack::Result<PostgresConnection, KernelError> {
        let con = self.pool.begin().await.convert_error()?;
        Ok(PostgresConnection(con))
    }
}

#[async_trait::async_trait]
impl Transaction for PostgresConnection {
    async fn commit(self) -> error_stack::Result<(), KernelError> {
        self.0.commit().await.convert_error()
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        self.0.rollback().await.convert_error()
    }
}

impl<T> ConvertError for Result<T, Error> {
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(|error| match error {
            Error::PoolTimedOut => Report::from(error).change_context(KernelError::Timeout),
            _ => Report::from(error).change_context(KernelError::Internal),
        })
    }
}

impl DependOnUserQuery<PostgresConnection> for PostgresDatabase {
    type UserQuery = PostgresUserRepository;
    fn user_query(&self) -> &Self::UserQuery {
        &PostgresUserRepository
    }
}

impl DependOnUserModifier<PostgresConnection> for PostgresDatabase {
    type UserModifier = PostgresUserRepository;
    fn user_modifier(&self) -> &Self::UserModifier {
        &PostgresUserRepository
    }
}

impl DependOnBookQuery<PostgresConnection> for PostgresDatabase {
    type BookQuery = PostgresBookRepository;
    fn book_query(&self) -> &Self::BookQuery {
        &PostgresBookRepository
    }
}

impl DependOnBookModifier<PostgresConnection> for PostgresDatabase {
    type BookModifier = PostgresBookRepository;
    fn book_modifier(&self) -> &Self::BookModifier {
        &PostgresBookRepository
    }
}

impl DependOnInventoryQuery<PostgresConnection> for PostgresDatabase {
    type InventoryQuery = PostgresInventoryRepository;
    fn inventory_query(&self) -> &Self::InventoryQuery {
        &PostgresInventoryRepository
    }
}

impl DependOnInventoryModifier<PostgresConnection> for PostgresDatabase {
    type InventoryModifier = PostgresInventoryRepository;
    fn inventory_modifier(&self) -> &Self::InventoryModifier {
        &PostgresInventoryRepository
    }
}

impl DependOnLedgerQuery<PostgresConnection> for PostgresDatabase {
    type LedgerQuery = PostgresLedgerRepository;
    fn ledger_query(&self) -> &Self::LedgerQuery {
        &PostgresLedgerRepository
    }
}

impl DependOnLedgerModifier<PostgresConnection> for PostgresDatabase {
    type LedgerModifier = PostgresLedgerRepository;
    fn ledger_modifier(&self) -> &Self::LedgerModifier {
        &PostgresLedgerRepository
    }
}

impl DependOnReturnPolicy for PostgresDatabase {
    fn return_policy(&self) -> ReturnPolicy {
        self.return_policy
    }
}
