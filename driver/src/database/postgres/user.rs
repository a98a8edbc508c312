use sqlx::types::Uuid;
use sqlx::PgConnection;

use kernel::interface::query::UserQuery;
use kernel::interface::update::UserModifier;
use kernel::prelude::entity::{User, UserId, UserName};
use kernel::KernelError;

use crate::database::postgres::PostgresConnection;
use crate::error::ConvertError;

pub struct PostgresUserRepository;

#[async_trait::async_trait]
impl UserQuery<PostgresConnection> for PostgresUserRepository {
    async fn find_by_id(
        &self,
        con: &mut PostgresConnection,
        id: &UserId,
    ) -> error_stack::Result<Option<User>, KernelError> {
        PgUserInternal::find_by_id(con.raw(), id).await
    }
}

#[async_trait::async_trait]
impl UserModifier<PostgresConnection> for PostgresUserRepository {
    async fn create(
        &self,
        con: &mut PostgresConnection,
        user: &User,
    ) -> error_stack::Result<(), KernelError> {
        PgUserInternal::create(con.raw(), user).await
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User::new(UserId::new(row.id), UserName::new(row.name))
    }
}

pub(in crate::database) struct PgUserInternal;

impl PgUserInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &UserId,
    ) -> error_stack::Result<Option<User>, KernelError> {
        let row = sqlx::query_as::<_, UserRow>(
            // language=postgresql
            r#"
            SELECT id, name
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(User::from))
    }

    async fn create(con: &mut PgConnection, user: &User) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO users (id, name)
            VALUES ($1, $2)
            "#,
        )
        .bind(user.id().as_ref())
        .bind(user.name().as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use uuid::Uuid;

    use kernel::interface::database::{DatabaseConnection, Transaction};
    use kernel::interface::query::UserQuery;
    use kernel::interface::update::UserModifier;
    use kernel::prelude::entity::{User, UserId, UserName};
    use kernel::KernelError;

    use crate::database::postgres::{PostgresDatabase, PostgresUserRepository};

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn find_by_id() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        db.migrate().await?;
        let mut connection = db.transact().await?;

        let id = UserId::new(Uuid::new_v4());
        let user = User::new(id.clone(), UserName::new("test".to_string()));

        PostgresUserRepository
            .create(&mut connection, &user)
            .await?;

        let found = PostgresUserRepository
            .find_by_id(&mut connection, &id)
            .await?;
        assert_eq!(found, Some(user));

        connection.roll_back().await?;
        Ok(())
    }
}
