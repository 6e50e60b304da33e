use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Request};
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::clock::{Clock, TokioClock};
use crate::error::Error;
use crate::job::{ClientConfig, ExpiredPolicy, JobHandle, JobRequest, JobStatus, PollPolicy};
use crate::transport::{ReqwestTransport, Transport};
use crate::{Result, decode};

/// Job types the API accepts.
static ALLOWED_JOB_TYPES: phf::Set<&'static str> = phf::phf_set! {
    "export_list_data",
};

const JOB_PATH: &str = "job";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Format used for the signed `format` parameter. Responses are always decoded as JSON.
const WIRE_FORMAT: &str = "json";

/// Signed `application/x-www-form-urlencoded` body for `POST /job`.
#[derive(Serialize)]
struct SignedForm<'a> {
    api_key: &'a str,
    sig: &'a str,
    json: &'a str,
    format: &'a str,
}

/// Client for the export job lifecycle: submit, poll, download.
///
/// Holds only immutable configuration, so one instance can serve many jobs
/// concurrently.
#[derive(Clone, Debug)]
pub struct JobClient<T = ReqwestTransport> {
    config: ClientConfig,
    transport: T,
    clock: Arc<dyn Clock>,
    policy: PollPolicy,
}

impl JobClient<ReqwestTransport> {
    /// Creates a client backed by a fresh `reqwest` connection pool.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }
}

impl<T: Transport> JobClient<T> {
    /// Creates a client that sends through `transport`.
    #[must_use]
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            clock: Arc::new(TokioClock),
            policy: PollPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Result<Self> {
        policy.validate()?;
        self.policy = policy;
        Ok(self)
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[must_use]
    pub fn poll_policy(&self) -> PollPolicy {
        self.policy
    }

    /// Submits an export job.
    ///
    /// The job only starts server-side; its data is fetched later through
    /// [`JobClient::get_job`] and [`JobClient::get_csv_data`]. An unknown job type is
    /// rejected before anything is sent.
    pub async fn create_job(&self, request: &JobRequest) -> Result<JobHandle> {
        if !ALLOWED_JOB_TYPES.contains(request.job_type.as_str()) {
            return Err(Error::invalid_job_type(request.job_type.as_str()));
        }

        let mut payload = Map::new();
        payload.insert("job".to_owned(), Value::from(request.job_type.as_str()));
        payload.insert("list".to_owned(), Value::from(request.list.as_str()));
        if let Some(fields) = &request.fields {
            payload.insert("fields".to_owned(), Value::Object(fields.clone()));
        }
        let json = serde_json::to_string(&payload)?;
        let sig = self.config.credentials.sign([("json", json.as_str())]);

        let form = serde_html_form::to_string(&SignedForm {
            api_key: self.config.credentials.api_key(),
            sig: &sig,
            json: &json,
            format: WIRE_FORMAT,
        })?;

        let mut url = self.config.endpoint(JOB_PATH)?;
        url.query_pairs_mut()
            .append_pair("format", &request.format.to_string());

        let mut http_request = Request::new(Method::POST, url);
        http_request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        *http_request.body_mut() = Some(form.into());

        let response = self.transport.execute(http_request).await?;
        let handle: JobHandle = decode(&response.body)?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            job_id = %handle.job_id,
            list = %handle.list,
            status = %handle.status,
            "export job submitted"
        );

        Ok(handle)
    }

    /// Fetches the current status of `job_id`.
    pub async fn get_job(&self, job_id: &str) -> Result<JobStatus> {
        let mut payload = Map::new();
        payload.insert("job_id".to_owned(), Value::from(job_id));
        let json = serde_json::to_string(&payload)?;
        let sig = self.config.credentials.sign([("json", json.as_str())]);

        let mut url = self.config.endpoint(JOB_PATH)?;
        url.query_pairs_mut()
            .append_pair("json", &json)
            .append_pair("api_key", self.config.credentials.api_key())
            .append_pair("sig", &sig)
            .append_pair("format", WIRE_FORMAT);
        let path = url.path().to_owned();

        let response = self.transport.get(url).await?;
        if !response.status.is_success() {
            let message = String::from_utf8_lossy(&response.body).into_owned();
            return Err(Error::status(response.status, Method::GET, path, message));
        }

        decode(&response.body)
    }

    /// Downloads the export at `url`. The body is returned as-is.
    pub async fn get_csv_data(&self, url: &Url) -> Result<Vec<u8>> {
        let response = self.transport.get(url.clone()).await?;
        Ok(response.body)
    }

    /// Submits a job, polls it every [`PollPolicy::interval`] and returns the export
    /// once it is ready.
    ///
    /// `timeout` is measured from submission and checked after each status call, so
    /// the final poll may finish slightly past the budget and still succeed. A failed
    /// status call ends polling immediately.
    pub async fn create_job_and_wait(
        &self,
        request: &JobRequest,
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        let handle = self.create_job(request).await?;
        let start = self.clock.now();

        loop {
            self.clock.sleep(self.policy.interval).await;

            let status = self.get_job(&handle.job_id).await?;

            #[cfg(feature = "tracing")]
            tracing::debug!(
                job_id = %status.job_id,
                status = %status.status,
                expired = status.expired,
                "polled export job"
            );

            if status.is_ready() {
                let Some(export_url) = status.export_url.as_ref() else {
                    return Err(Error::decode(format!(
                        "job {} completed without an export_url",
                        status.job_id
                    )));
                };

                #[cfg(feature = "tracing")]
                tracing::info!(job_id = %status.job_id, "export job completed, downloading");

                return self.get_csv_data(export_url).await;
            }

            if status.is_completed() && self.policy.on_expired == ExpiredPolicy::Fail {
                return Err(Error::expired(status.job_id));
            }

            if self.clock.now().saturating_duration_since(start) > timeout {
                #[cfg(feature = "tracing")]
                tracing::warn!(job_id = %handle.job_id, ?timeout, "export job timed out");

                return Err(Error::timeout(timeout));
            }
        }
    }
}
