//! CLI argument definitions for the canhoto binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::output::OutputFormat;

/// Upper bound of `--session-hours`
pub const MAX_SESSION_HOURS: u64 = 24 * 366;

/// Upper bound of `--max-upload-mb`
pub const MAX_UPLOAD_MB: u64 = 1024;

/// Storage backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// SQLite database file in the data directory (default)
    Sqlite,
    /// PostgreSQL server
    Postgres,
}

/// Delivery-receipt photo archive
#[derive(Parser, Debug)]
#[command(name = "canhoto")]
#[command(about = "Canhoto: capture, look up and e-mail delivery receipts by invoice number")]
#[command(version)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the web server
    Serve(ServeArgs),
    /// Manage operator accounts
    #[command(subcommand)]
    User(UserCommands),
    /// Inspect stored receipts
    #[command(subcommand)]
    Receipts(ReceiptsCommands),
    /// Show store information
    Info(InfoArgs),
    /// Check health of a running server
    Health(HealthArgs),
}

/// Store selection shared by every command that opens the database
#[derive(clap::Args, Debug, Clone)]
pub struct StoreArgs {
    /// Storage backend to use
    #[arg(short, long, value_enum, default_value = "sqlite", env = "CANHOTO_BACKEND")]
    pub backend: Backend,

    /// Data directory; the SQLite store lives at <data-dir>/canhoto.db
    #[arg(short = 'D', long, env = "CANHOTO_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// PostgreSQL connection URL; takes precedence over the DB_* parts
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// PostgreSQL host (optionally host:port)
    #[arg(long, env = "DB_SERVER")]
    pub db_server: Option<String>,

    /// PostgreSQL database name
    #[arg(long, env = "DB_DATABASE")]
    pub db_database: Option<String>,

    /// PostgreSQL user
    #[arg(long, env = "DB_USER")]
    pub db_user: Option<String>,

    /// PostgreSQL password
    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,
}

/// Outbound mail relay settings
#[derive(clap::Args, Debug, Clone)]
pub struct MailArgs {
    /// Sender address, also the relay login
    #[arg(long = "mail-from", env = "EMAIL_ORIGEM")]
    pub sender: Option<String>,

    /// Relay password
    #[arg(long = "mail-password", env = "EMAIL_SENHA", hide_env_values = true)]
    pub password: Option<String>,

    /// Relay host
    #[arg(long = "smtp-server", env = "SMTP_SERVER")]
    pub server: Option<String>,

    /// Relay port (STARTTLS)
    #[arg(id = "smtp_port", long = "smtp-port", env = "SMTP_PORT", default_value_t = canhoto::notify::smtp::DEFAULT_SMTP_PORT)]
    pub port: u16,

    /// Relay timeout in seconds
    #[arg(long = "smtp-timeout", env = "CANHOTO_SMTP_TIMEOUT", default_value_t = 30)]
    pub timeout: u64,
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "CANHOTO_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "CANHOTO_HOST")]
    pub host: String,

    /// Session lifetime in hours (at most one year)
    #[arg(
        long,
        default_value_t = 12,
        env = "CANHOTO_SESSION_HOURS",
        value_parser = clap::value_parser!(u64).range(1..=MAX_SESSION_HOURS)
    )]
    pub session_hours: u64,

    /// Largest accepted upload, in megabytes
    #[arg(
        long,
        default_value_t = 20,
        env = "CANHOTO_MAX_UPLOAD_MB",
        value_parser = clap::value_parser!(u64).range(1..=MAX_UPLOAD_MB)
    )]
    pub max_upload_mb: u64,

    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub mail: MailArgs,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create an operator account
    Add(UserAddArgs),
    /// List operator accounts
    List(UserListArgs),
}

#[derive(clap::Args, Debug)]
pub struct UserAddArgs {
    /// Login name
    pub username: String,

    /// Password for the new account
    #[arg(long, env = "CANHOTO_USER_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(clap::Args, Debug)]
pub struct UserListArgs {
    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Subcommand, Debug)]
pub enum ReceiptsCommands {
    /// List the most recent captures
    List(ReceiptsListArgs),
}

#[derive(clap::Args, Debug)]
pub struct ReceiptsListArgs {
    /// Maximum number of receipts to show
    #[arg(short, long, default_value_t = 20)]
    pub limit: u32,

    #[command(flatten)]
    pub store: StoreArgs,
}

/// Arguments for the info command
#[derive(clap::Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub store: StoreArgs,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Base URL of the server to check
    #[arg(long, default_value = "http://127.0.0.1:3000", env = "CANHOTO_URL")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_user_add() {
        let cli = Cli::try_parse_from([
            "canhoto",
            "user",
            "add",
            "operador",
            "--password",
            "pw",
            "--backend",
            "sqlite",
        ])
        .unwrap();
        match cli.command {
            Commands::User(UserCommands::Add(args)) => {
                assert_eq!(args.username, "operador");
                assert_eq!(args.password, "pw");
                assert_eq!(args.store.backend, Backend::Sqlite);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_serve_limits_are_bounded() {
        let cli = Cli::try_parse_from(["canhoto", "serve"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.session_hours, 12);
                assert_eq!(args.max_upload_mb, 20);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        for flag in ["--session-hours", "--max-upload-mb"] {
            for value in ["0", "18446744073709551615"] {
                assert!(
                    Cli::try_parse_from(["canhoto", "serve", flag, value]).is_err(),
                    "{flag} {value} should be rejected"
                );
            }
        }
    }

    #[test]
    fn test_parse_receipts_list_json() {
        let cli =
            Cli::try_parse_from(["canhoto", "receipts", "list", "--limit", "5", "--format", "json"])
                .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Receipts(ReceiptsCommands::List(args)) => assert_eq!(args.limit, 5),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
