use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite};
use thiserror::Error;

use crate::auth::password::hash_password_blocking;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String, // Argon2 PHC string, never exposed in JSON
    pub is_admin: bool,
}

#[derive(Debug, Error)]
pub enum CreateUserError {
    #[error("email already registered")]
    EmailTaken,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl User {
    /// Find a user by exact (case-sensitive) email.
    pub async fn find_by_email<'e, E>(db: E, email: &str) -> anyhow::Result<Option<User>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, hashed_password, is_admin
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    /// Hash `password` and insert a new user.
    pub async fn create<'e, E>(db: E, email: &str, password: &str) -> Result<User, CreateUserError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let hash = hash_password_blocking(password).await?;
        Self::insert(db, email, &hash).await
    }

    /// Insert a user whose password is already hashed. A duplicate email
    /// surfaces as [`CreateUserError::EmailTaken`] even if a concurrent
    /// request won the race past the caller's pre-check.
    pub async fn insert<'e, E>(
        db: E,
        email: &str,
        hashed_password: &str,
    ) -> Result<User, CreateUserError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, hashed_password)
            VALUES (?, ?)
            RETURNING id, email, hashed_password, is_admin
            "#,
        )
        .bind(email)
        .bind(hashed_password)
        .fetch_one(db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                CreateUserError::EmailTaken
            }
            other => CreateUserError::Other(anyhow::Error::new(other).context("insert user")),
        })?;
        Ok(user)
    }
}
