//! Export job lifecycle against the `/job` endpoint.
//!
//! - submit a job with a signed form post
//! - poll its status with signed `GET` requests until it completes or times out
//! - download the resulting CSV from the export URL

mod client;
mod config;
mod policy;
mod types;

pub use client::JobClient;
pub use config::{API_KEY_ENV, BASE_URL_ENV, ClientConfig, SECRET_KEY_ENV};
pub use policy::{DEFAULT_POLL_INTERVAL, ExpiredPolicy, PollPolicy};
pub use types::{JobHandle, JobRequest, JobState, JobStatus, ResponseFormat};
