//! User management commands.

use canhoto::AuthService;

use crate::cli::{UserAddArgs, UserListArgs};
use crate::output::{OutputFormat, print_table};
use crate::store::open_store;

/// Run the `user add` command
pub async fn add(args: &UserAddArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(&args.store).await?;
    let auth = AuthService::new(store.clone());

    let result = auth.create_user(&args.username, &args.password).await;
    store.close().await;
    result?;

    println!("Created user {}", args.username);
    Ok(())
}

/// Run the `user list` command
pub async fn list(
    args: &UserListArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(&args.store).await?;
    let users = AuthService::new(store.clone()).list_users().await;
    store.close().await;
    let users = users?;

    match format {
        OutputFormat::Human => {
            if users.is_empty() {
                println!("No users found.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = users.into_iter().map(|u| vec![u]).collect();
            print_table(&["USERNAME"], &rows);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(&users)?);
        }
    }

    Ok(())
}
