//! Runs one list export end to end.
//!
//! ```sh
//! SAILTHRU_API_KEY=... SAILTHRU_SECRET_KEY=... \
//!     cargo run --example export --features tracing -- my_list
//! ```

use std::env;
use std::time::Duration;

use sailthru_jobs::job::{ClientConfig, JobClient, JobRequest};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let list = env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: export <list>"))?;

    let client = JobClient::new(ClientConfig::from_env()?);
    let request = JobRequest::builder()
        .job_type("export_list_data")
        .list(list)
        .build();

    let csv = client
        .create_job_and_wait(&request, Duration::from_secs(120))
        .await?;

    let rows = csv.split(|b| *b == b'\n').filter(|l| !l.is_empty()).count();
    tracing::info!(bytes = csv.len(), rows, "export downloaded");

    Ok(())
}
