use uuid::Uuid;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::update::{DependOnUserModifier, UserModifier};
use kernel::prelude::entity::{User, UserId, UserName};
use kernel::KernelError;

use crate::transfer::CreateUserDto;

#[async_trait::async_trait]
pub trait CreateUserService<Connection: Transaction + Send>:
    'static + Sync + Send + DependOnDatabaseConnection<Connection> + DependOnUserModifier<Connection>
{
    async fn create_user(&self, dto: CreateUserDto) -> error_stack::Result<Uuid, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let uuid = Uuid::new_v4();
        let user = User::new(UserId::new(uuid), UserName::new(dto.name));
        match self.user_modifier().create(&mut connection, &user).await {
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

impl<Connection: Transaction + Send, T> CreateUserService<Connection> for T where
    T: DependOnDatabaseConnection<Connection> + DependOnUserModifier<Connection>
{
}
