//! The HTTP capability the job client depends on.
//!
//! [`JobClient`](crate::job::JobClient) never talks to `reqwest` directly. It hands
//! fully built requests to a [`Transport`], which lets tests substitute a
//! deterministic fake.

use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Request, StatusCode};
use url::Url;

use crate::Result;

/// Fully buffered HTTP response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl Response {
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Minimal request/response surface.
///
/// Implementations must be shareable across tasks; a faithful one holds no mutable
/// state of its own.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends an arbitrary prebuilt request.
    async fn execute(&self, request: Request) -> Result<Response>;

    /// Issues an unauthenticated `GET`.
    async fn get(&self, url: Url) -> Result<Response>;
}

/// [`Transport`] backed by a pooled `reqwest` client.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_client(client: ReqwestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: Request) -> Result<Response> {
        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.bytes().await?;

        Ok(Response::new(status, body.to_vec()))
    }

    async fn get(&self, url: Url) -> Result<Response> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        Ok(Response::new(status, body.to_vec()))
    }
}
