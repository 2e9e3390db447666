//! SQL schema definitions and migrations.
//!
//! The schema is portable between SQLite and PostgreSQL.
//!
//! # Migration System
//!
//! Migrations are code-based rather than SQL files so each step can issue
//! dialect-specific SQL when it has to.
//!
//! ## Adding a New Migration
//!
//! 1. Increment `SCHEMA_VERSION`
//! 2. Add a new `migrate_vN_to_vM` async function
//! 3. Add the migration to the match statement in `run_migration`

use crate::Result;

use super::{SqlxResultExt, SqlxStore, StoreError};

/// Current schema version.
///
/// Increment this when making schema changes that require migration.
pub const SCHEMA_VERSION: i64 = 1;

/// SQL statements to create the schema tables.
pub const CREATE_TABLES: &[&str] = &[
    // BIGINT (64-bit) used for portability between SQLite and PostgreSQL
    "CREATE TABLE IF NOT EXISTS schema_version (
        version BIGINT PRIMARY KEY
    )",
    // Operator credentials. password_hash is an Argon2id PHC string carrying its own salt.
    "CREATE TABLE IF NOT EXISTS users (
        username TEXT PRIMARY KEY NOT NULL,
        password_hash TEXT NOT NULL
    )",
    // One photo per invoice number; the primary key rejects a second capture.
    // captured_at is milliseconds since the Unix epoch (UTC).
    "CREATE TABLE IF NOT EXISTS receipts (
        invoice_number TEXT PRIMARY KEY NOT NULL,
        image BYTEA NOT NULL,
        captured_at BIGINT NOT NULL
    )",
];

/// SQL statements to create indexes.
pub const CREATE_INDEXES: &[&str] =
    &["CREATE INDEX IF NOT EXISTS idx_receipts_captured_at ON receipts(captured_at)"];

/// Initialize the database schema.
///
/// Creates tables and indexes if they don't exist, and runs migrations if the
/// stored schema version is older than [`SCHEMA_VERSION`].
pub async fn initialize(store: &SqlxStore) -> Result<()> {
    let pool = store.pool();

    for statement in CREATE_TABLES {
        sqlx::query(statement)
            .execute(pool)
            .await
            .sql_context(&format!("Schema creation failed - SQL: {statement}"))?;
    }

    let row: Option<(i64,)> = sqlx::query_as("SELECT version FROM schema_version")
        .fetch_optional(pool)
        .await
        .sql_context("Failed to check schema version")?;

    match row {
        None => {
            sqlx::query("INSERT INTO schema_version (version) VALUES ($1)")
                .bind(SCHEMA_VERSION)
                .execute(pool)
                .await
                .sql_context("Failed to initialize schema version")?;
        }
        Some((current_version,)) if current_version < SCHEMA_VERSION => {
            migrate(store, current_version, SCHEMA_VERSION).await?;
        }
        Some((current_version,)) if current_version > SCHEMA_VERSION => {
            return Err(StoreError::SqlxError {
                reason: format!(
                    "Database schema v{current_version} is newer than this build (v{SCHEMA_VERSION})"
                ),
                source: None,
            }
            .into());
        }
        Some(_) => {}
    }

    for statement in CREATE_INDEXES {
        sqlx::query(statement)
            .execute(pool)
            .await
            .sql_context(&format!("Index creation failed - SQL: {statement}"))?;
    }

    tracing::debug!(version = SCHEMA_VERSION, kind = store.kind().as_str(), "Schema ready");
    Ok(())
}

/// Run migrations sequentially from one schema version to another.
async fn migrate(store: &SqlxStore, from: i64, to: i64) -> Result<()> {
    tracing::info!(from, to, "Starting SQL schema migration");

    let mut current = from;
    while current < to {
        let next = current + 1;
        tracing::info!(from = current, to = next, "Running migration");

        run_migration(store, current, next).await?;

        sqlx::query("UPDATE schema_version SET version = $1")
            .bind(next)
            .execute(store.pool())
            .await
            .sql_context(&format!("Failed to update schema version to {next}"))?;

        tracing::info!(version = next, "Migration completed");
        current = next;
    }

    Ok(())
}

/// Execute a single migration step.
async fn run_migration(store: &SqlxStore, from: i64, to: i64) -> Result<()> {
    // No migrations exist yet: v1 is the first schema.
    let _ = store;

    Err(StoreError::SqlxError {
        reason: format!(
            "Unknown migration path: v{from} to v{to}. \
             This likely means SCHEMA_VERSION was incremented without adding a migration."
        ),
        source: None,
    }
    .into())
}
