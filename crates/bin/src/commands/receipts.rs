//! Receipt inspection commands.

use canhoto::ReceiptService;

use crate::cli::ReceiptsListArgs;
use crate::output::{OutputFormat, print_table};
use crate::store::open_store;

/// Run the `receipts list` command
pub async fn list(
    args: &ReceiptsListArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(&args.store).await?;
    let recent = ReceiptService::new(store.clone()).recent(args.limit).await;
    store.close().await;
    let recent = recent?;

    match format {
        OutputFormat::Human => {
            if recent.is_empty() {
                println!("No receipts found.");
                return Ok(());
            }

            let rows: Vec<Vec<String>> = recent
                .iter()
                .map(|r| {
                    vec![
                        r.invoice.to_string(),
                        r.captured_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                    ]
                })
                .collect();
            print_table(&["INVOICE", "CAPTURED AT"], &rows);
        }
        OutputFormat::Json => {
            let entries: Vec<_> = recent
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "invoice": r.invoice.as_str(),
                        "captured_at": r.captured_at.to_rfc3339(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string(&entries)?);
        }
    }

    Ok(())
}
