//! Health check command - asks a running canhoto server for its `/health` report.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::HealthArgs;
use crate::output::OutputFormat;

/// Body served by `GET /health`
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
struct HealthReport {
    status: String,
    backend: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    receipts: Option<u64>,
}

impl HealthReport {
    fn is_healthy(&self) -> bool {
        self.status == "healthy" && self.receipts.is_some()
    }

    fn summary(&self) -> String {
        match self.receipts {
            Some(count) => format!(
                "{}: {} store, {count} receipt(s) archived",
                self.status, self.backend
            ),
            None => format!("{}: {} store unreachable", self.status, self.backend),
        }
    }
}

/// Health endpoint URL for a server base URL
fn health_url(base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.ends_with("/health") {
        base.to_string()
    } else {
        format!("{base}/health")
    }
}

/// Decode a `/health` body. The server answers 503 with the same shape when
/// its store is down, so the body is read regardless of the HTTP status.
fn parse_report(body: &str) -> Result<HealthReport, String> {
    serde_json::from_str(body).map_err(|e| format!("unexpected /health response: {e}"))
}

/// Run the health check command
pub async fn run(args: &HealthArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let url = health_url(&args.url);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()?;

    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(e) => {
            eprintln!("unhealthy: failed to connect to {url}: {e}");
            std::process::exit(1);
        }
    };

    let http_status = response.status();
    let body = response.text().await?;
    let report = match parse_report(&body) {
        Ok(report) => report,
        Err(reason) => {
            eprintln!("unhealthy: HTTP {http_status}, {reason}");
            std::process::exit(1);
        }
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Human => println!("{}", report.summary()),
    }

    if !(http_status.is_success() && report.is_healthy()) {
        std::process::exit(1);
    }
    Ok(())
}
