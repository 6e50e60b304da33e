//! Client for the Sailthru asynchronous export job API.
//!
//! The workflow is: submit an export job, poll its status until it completes, then
//! download the CSV it produced. Parsing the CSV is left to the caller.
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use sailthru_jobs::job::{ClientConfig, JobClient, JobRequest};
//!
//! # async fn example() -> sailthru_jobs::Result<()> {
//! let client = JobClient::new(ClientConfig::from_env()?);
//! let request = JobRequest::builder()
//!     .job_type("export_list_data")
//!     .list("newsletter")
//!     .build();
//!
//! let csv = client
//!     .create_job_and_wait(&request, Duration::from_secs(60))
//!     .await?;
//! # let _ = csv;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod clock;
pub mod error;
pub mod job;
pub mod transport;

use serde::de::DeserializeOwned;

pub use error::{Error, Kind};

pub type Result<T> = std::result::Result<T, Error>;

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.sailthru.com";

/// Decodes a JSON response body into `T`.
///
/// With the `tracing` feature, failures report the JSON path that did not match and
/// fields the target type does not know about are logged.
#[cfg(not(feature = "tracing"))]
pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(body)?)
}

#[cfg(feature = "tracing")]
pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let mut unknown = Vec::new();
    let mut de = serde_json::Deserializer::from_slice(body);
    let mut on_ignored = |path: serde_ignored::Path<'_>| {
        unknown.push(path.to_string());
    };
    let ignoring = serde_ignored::Deserializer::new(&mut de, &mut on_ignored);

    let value: T = serde_path_to_error::deserialize(ignoring).map_err(|e| {
        tracing::warn!(path = %e.path(), error = %e.inner(), "failed to decode response");
        Error::from(e.into_inner())
    })?;
    de.end()?;

    if !unknown.is_empty() {
        tracing::debug!(
            fields = ?unknown,
            target_type = std::any::type_name::<T>(),
            "ignored unknown response fields"
        );
    }

    Ok(value)
}
