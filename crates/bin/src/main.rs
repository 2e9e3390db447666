use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod output;
mod session;
mod store;
mod templates;

use cli::{Cli, Commands, ReceiptsCommands, UserCommands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("canhoto=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Serve(args) => commands::serve::run(args).await,
        Commands::User(UserCommands::Add(args)) => commands::user::add(args).await,
        Commands::User(UserCommands::List(args)) => commands::user::list(args, cli.format).await,
        Commands::Receipts(ReceiptsCommands::List(args)) => {
            commands::receipts::list(args, cli.format).await
        }
        Commands::Info(args) => commands::info::run(args, cli.format).await,
        Commands::Health(args) => commands::health::run(args, cli.format).await,
    }
}
