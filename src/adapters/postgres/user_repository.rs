//! `users` table.

use async_trait::async_trait;

use super::unit_of_work::{read_error, write_error, PgUnitOfWork};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::user::User;
use crate::ports::{Repository, UserRepository};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    password: String,
    name: String,
    token: String,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = UserId::new(row.id).map_err(|e| {
            DomainError::new(ErrorCode::InternalError, format!("Invalid user id: {}", e))
        })?;
        Ok(User {
            id,
            password: row.password,
            name: row.name,
            token: row.token,
            created_at: Timestamp::from_millis(row.created_at),
            updated_at: Timestamp::from_millis(row.updated_at),
        })
    }
}

const SELECT_USER: &str =
    "SELECT id, password, name, token, created_at, updated_at FROM users";

#[async_trait]
impl Repository<User> for PgUnitOfWork {
    async fn create(&mut self, user: &User) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, password, name, token, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.password)
        .bind(&user.name)
        .bind(&user.token)
        .bind(user.created_at.as_millis())
        .bind(user.updated_at.as_millis())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| write_error("create user", ErrorCode::UserAlreadyExists, e))?;
        Ok(())
    }

    async fn update(&mut self, user: &User) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE users
            SET password = $1, name = $2, token = $3, updated_at = $4
            WHERE id = $5
            "#,
        )
        .bind(&user.password)
        .bind(&user.name)
        .bind(&user.token)
        .bind(user.updated_at.as_millis())
        .bind(user.id.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| write_error("update user", ErrorCode::UserAlreadyExists, e))?;
        Ok(())
    }

    async fn delete(&mut self, user: &User) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user.id.as_str())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| read_error("delete user", e))?;
        Ok(())
    }

    async fn count_by_id(&mut self, id: &UserId) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = $1")
            .bind(id.as_str())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| read_error("count users", e))
    }

    async fn find_by_id(&mut self, id: &UserId) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{} WHERE id = $1 FOR UPDATE", SELECT_USER))
            .bind(id.as_str())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| read_error("find user", e))?;
        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl UserRepository for PgUnitOfWork {
    async fn find_by_token(&mut self, token: &str) -> Result<Option<User>, DomainError> {
        if token.is_empty() {
            return Ok(None);
        }
        let row: Option<UserRow> = sqlx::query_as(&format!("{} WHERE token = $1", SELECT_USER))
            .bind(token)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| read_error("find user by token", e))?;
        row.map(User::try_from).transpose()
    }
}
