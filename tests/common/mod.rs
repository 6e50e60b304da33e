#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Method, Request, StatusCode};
use sailthru_jobs::clock::Clock;
use sailthru_jobs::job::ClientConfig;
use sailthru_jobs::transport::{Response, Transport};
use sailthru_jobs::{Error, Kind, Result};
use secrecy::SecretString;
use url::Url;

pub const API_KEY: &str = "TestAPIKey";
pub const SECRET_KEY: &str = "TestSecretKey";
pub const BASE_URL: &str = "https://api.sailthru.com";
pub const EXPORT_URL: &str = "https://s3.amazonaws.com/sailthru/export/2015/05/19/UNIQUE_FILE_ID";

pub const CREATED_JOB: &str = r#"{"job_id":"555a21e5a6cba8e27427eb23","name":"Export All List Data: ad_hoc_test_list_1","list":"ad_hoc_test_list_1","status":"pending"}"#;
pub const PENDING_JOB: &str = r#"{"job_id":"555a21e5a6cba8e27427eb23","name":"Export All List Data: ad_hoc_test_list_1","list":"ad_hoc_test_list_1","status":"pending"}"#;
pub const EXPIRED_JOB: &str = r#"{"job_id":"555a21e5a6cba8e27427eb23","name":"Export All List Data: ad_hoc_test_list_1","list":"ad_hoc_test_list_1","status":"completed","start_time":"Mon, 18 May 2015 13:31:17 -0400","end_time":"Mon, 18 May 2015 13:31:18 -0400","filename":"ad_hoc_test_list_1.csv","expired":true}"#;
pub const INVALID_JOB: &str = r#"{"error" : 99,"errormsg" : "Invalid Job ID: 555a468b975910683a63b667"}"#;
pub const CSV: &str = "\"Profile Id\",\"Email Hash\",userid\n554bb7153b35d0732c8c0e8a,14b5aebbfaf84afa184df9b67983cb04,10\n554bb7143b35d0732c8c0e83,332a70d9324e29a435652f302b1e39fc,3";

/// Completed job whose export lives at [`EXPORT_URL`].
pub fn completed_job() -> String {
    format!(
        r#"{{"job_id":"555a21e5a6cba8e27427eb23","name":"Export All List Data: ad_hoc_test_list_1","list":"ad_hoc_test_list_1","status":"completed","start_time":"Mon, 18 May 2015 16:07:39 -0400","end_time":"Mon, 18 May 2015 16:07:40 -0400","filename":"ad_hoc_test_list_1.csv","export_url":"{EXPORT_URL}"}}"#
    )
}

pub fn config() -> ClientConfig {
    ClientConfig::from_raw(API_KEY, SecretString::from(SECRET_KEY.to_owned()), Some(BASE_URL))
        .expect("test config is valid")
}

/// A canned answer for one call.
#[derive(Clone, Debug)]
pub enum Canned {
    Respond(StatusCode, String),
    Fail(String),
}

impl Canned {
    pub fn ok(body: impl Into<String>) -> Self {
        Canned::Respond(StatusCode::OK, body.into())
    }

    fn into_result(self) -> Result<Response> {
        match self {
            Canned::Respond(status, body) => Ok(Response::new(status, body)),
            Canned::Fail(message) => Err(Error::with_source(
                Kind::Transport,
                io::Error::new(io::ErrorKind::ConnectionReset, message),
            )),
        }
    }
}

/// One request seen by the fake.
#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: Method,
    pub url: Url,
    pub content_type: Option<String>,
    pub body: Option<String>,
}

/// [`Transport`] answering from per-route queues.
///
/// Routes are `"{METHOD} {url without query}"`. Each queue is drained in order and
/// its last entry repeats once the rest are used up.
#[derive(Debug, Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<String, VecDeque<Canned>>>,
    calls: Mutex<Vec<Recorded>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn route(self, method: Method, url: &str, responses: impl IntoIterator<Item = Canned>) -> Self {
        let key = route_key(&method, &Url::parse(url).expect("route url"));
        self.routes
            .lock()
            .expect("routes lock")
            .entry(key)
            .or_default()
            .extend(responses);
        self
    }

    /// Standard table: job creation, the given status sequence, and the CSV export.
    pub fn with_job_statuses(statuses: impl IntoIterator<Item = Canned>) -> Self {
        Self::new()
            .route(Method::POST, &job_url(), [Canned::ok(CREATED_JOB)])
            .route(Method::GET, &job_url(), statuses)
            .route(Method::GET, EXPORT_URL, [Canned::ok(CSV)])
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn count(&self, method: &Method, url: &str) -> usize {
        let key = route_key(method, &Url::parse(url).expect("route url"));
        self.calls()
            .iter()
            .filter(|call| route_key(&call.method, &call.url) == key)
            .count()
    }

    fn answer(&self, recorded: Recorded) -> Result<Response> {
        let key = route_key(&recorded.method, &recorded.url);
        self.calls.lock().expect("calls lock").push(recorded);

        let mut routes = self.routes.lock().expect("routes lock");
        let queue = routes
            .get_mut(&key)
            .unwrap_or_else(|| panic!("no canned response for {key}"));
        let canned = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };

        canned
            .unwrap_or_else(|| panic!("empty queue for {key}"))
            .into_result()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn execute(&self, request: Request) -> Result<Response> {
        let recorded = Recorded {
            method: request.method().clone(),
            url: request.url().clone(),
            content_type: request
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
            body: request
                .body()
                .and_then(reqwest::Body::as_bytes)
                .map(|b| String::from_utf8_lossy(b).into_owned()),
        };
        self.answer(recorded)
    }

    async fn get(&self, url: Url) -> Result<Response> {
        self.answer(Recorded {
            method: Method::GET,
            url,
            content_type: None,
            body: None,
        })
    }
}

/// [`Clock`] that advances only when slept on.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock().expect("clock lock")
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        *self.elapsed.lock().expect("clock lock") += duration;
    }
}

pub fn job_url() -> String {
    format!("{BASE_URL}/job")
}

/// Decoded query string of a recorded call.
pub fn query(url: &Url) -> HashMap<String, String> {
    url.query_pairs().into_owned().collect()
}

fn route_key(method: &Method, url: &Url) -> String {
    let mut bare = url.clone();
    bare.set_query(None);
    format!("{method} {bare}")
}
