//! Credential table operations.

use crate::Result;

use super::{SqlxResultExt, SqlxStore, StoreError, is_unique_violation};

/// Insert a user row. Fails with [`StoreError::UniqueViolation`] when the
/// username is taken.
pub async fn insert(store: &SqlxStore, username: &str, password_hash: &str) -> Result<()> {
    let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES ($1, $2)")
        .bind(username)
        .bind(password_hash)
        .execute(store.pool())
        .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) if is_unique_violation(&e) => Err(StoreError::UniqueViolation {
            table: "users",
            key: username.to_string(),
        }
        .into()),
        Err(e) => Err(e).sql_context("Failed to insert user"),
    }
}

/// Get the stored password hash for a username, if the user exists.
pub async fn password_hash(store: &SqlxStore, username: &str) -> Result<Option<String>> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT password_hash FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(store.pool())
            .await
            .sql_context("Failed to look up user")?;

    Ok(row.map(|(hash,)| hash))
}

/// List all usernames in alphabetical order.
pub async fn list_usernames(store: &SqlxStore) -> Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT username FROM users ORDER BY username")
        .fetch_all(store.pool())
        .await
        .sql_context("Failed to list users")?;

    Ok(rows.into_iter().map(|(name,)| name).collect())
}

/// Count user rows.
pub async fn count(store: &SqlxStore) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(store.pool())
        .await
        .sql_context("Failed to count users")?;

    Ok(count)
}
