//! Store info command - shows backend, schema version, user and receipt counts.

use canhoto::store::schema::SCHEMA_VERSION;
use canhoto::{AuthService, ReceiptService};

use crate::cli::InfoArgs;
use crate::output::OutputFormat;
use crate::store::{backend_label, open_store};

/// Run the info command
pub async fn run(args: &InfoArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(&args.store).await?;

    let users = AuthService::new(store.clone()).user_count().await?;
    let receipts = ReceiptService::new(store.clone()).count().await?;
    store.close().await;

    let backend_str = backend_label(&args.store);

    match format {
        OutputFormat::Human => {
            println!("Backend:     {backend_str}");
            println!("Schema:      v{SCHEMA_VERSION}");
            println!("Users:       {users}");
            println!("Receipts:    {receipts}");
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "backend": backend_str,
                "schema_version": SCHEMA_VERSION,
                "users": users,
                "receipts": receipts,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    Ok(())
}
