//! Store creation and utility functions.

use std::path::PathBuf;

use canhoto::SqlxStore;

use crate::cli::{Backend, StoreArgs};

/// SQLite file name inside the data directory.
pub const SQLITE_FILE: &str = "canhoto.db";

/// Redact credentials from a PostgreSQL connection URL for safe logging
pub fn redact_postgres_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        let mut redacted = parsed.clone();
        if !parsed.username().is_empty() {
            let _ = redacted.set_username("***");
        }
        if parsed.password().is_some() {
            let _ = redacted.set_password(Some("***"));
        }
        redacted.to_string()
    } else {
        "postgres://***@<unparsable-url>".to_string()
    }
}

/// Resolve the PostgreSQL URL: `--database-url` wins, otherwise it is
/// composed from the `DB_SERVER`/`DB_DATABASE`/`DB_USER`/`DB_PASSWORD` parts.
pub fn postgres_url(args: &StoreArgs) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(url) = &args.database_url {
        return Ok(url.clone());
    }

    let server = args
        .db_server
        .as_deref()
        .ok_or("PostgreSQL backend requires --database-url (DATABASE_URL) or DB_SERVER")?;
    let database = args
        .db_database
        .as_deref()
        .ok_or("PostgreSQL backend requires DB_DATABASE when DATABASE_URL is not set")?;

    let (host, port) = match server.rsplit_once(':') {
        Some((host, port)) => (host, Some(port.parse::<u16>()?)),
        None => (server, None),
    };

    let mut url = url::Url::parse("postgres://localhost")?;
    url.set_host(Some(host))?;
    url.set_port(port)
        .map_err(|()| format!("invalid DB_SERVER port in {server}"))?;
    if let Some(user) = &args.db_user {
        url.set_username(user)
            .map_err(|()| "DB_USER cannot be used in a URL")?;
    }
    if let Some(password) = &args.db_password {
        url.set_password(Some(password))
            .map_err(|()| "DB_PASSWORD cannot be used in a URL")?;
    }
    url.set_path(database);

    Ok(url.to_string())
}

/// Open the configured store, creating the schema if needed
pub async fn open_store(args: &StoreArgs) -> Result<SqlxStore, Box<dyn std::error::Error>> {
    match args.backend {
        Backend::Sqlite => {
            let data_dir = args.data_dir.clone().unwrap_or_else(|| PathBuf::from("."));
            tokio::fs::create_dir_all(&data_dir).await?;

            let db_path = data_dir.join(SQLITE_FILE);
            tracing::info!("Using SQLite store at {}", db_path.display());
            Ok(SqlxStore::open_sqlite(&db_path).await?)
        }
        Backend::Postgres => {
            let url = postgres_url(args)?;
            let display_url = redact_postgres_url(&url);
            tracing::info!("Connecting to PostgreSQL at {}", display_url);

            match SqlxStore::connect_postgres(&url).await {
                Ok(store) => {
                    tracing::info!("Connected to PostgreSQL successfully");
                    Ok(store)
                }
                Err(e) => {
                    Err(format!("Failed to connect to PostgreSQL at {display_url}: {e}").into())
                }
            }
        }
    }
}

/// Human-readable label for the configured backend
pub fn backend_label(args: &StoreArgs) -> &'static str {
    match args.backend {
        Backend::Sqlite => "sqlite",
        Backend::Postgres => "postgres",
    }
}
