use std::env;

use secrecy::{ExposeSecret as _, SecretString};
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::{DEFAULT_BASE_URL, Result};

pub const API_KEY_ENV: &str = "SAILTHRU_API_KEY";
pub const SECRET_KEY_ENV: &str = "SAILTHRU_SECRET_KEY";
pub const BASE_URL_ENV: &str = "SAILTHRU_BASE_URL";

/// Connection settings for a [`JobClient`](crate::job::JobClient).
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: Url,
    pub credentials: Credentials,
}

impl ClientConfig {
    /// Targets the production endpoint.
    pub fn new(api_key: &str, secret_key: SecretString) -> Result<Self> {
        Self::from_raw(api_key, secret_key, None)
    }

    /// Like [`ClientConfig::new`] with an optional base URL override.
    pub fn from_raw(
        api_key: &str,
        secret_key: SecretString,
        base_url: Option<&str>,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::validation("api key must not be empty"));
        }
        if secret_key.expose_secret().trim().is_empty() {
            return Err(Error::validation("secret key must not be empty"));
        }

        let base_url = Url::parse(base_url.unwrap_or(DEFAULT_BASE_URL))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::validation(format!(
                "base url `{base_url}` cannot carry a path"
            )));
        }

        Ok(Self {
            base_url,
            credentials: Credentials::new(api_key.to_owned(), secret_key),
        })
    }

    /// Reads `SAILTHRU_API_KEY`, `SAILTHRU_SECRET_KEY` and optionally
    /// `SAILTHRU_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        let api_key = required_var(API_KEY_ENV)?;
        let secret_key = SecretString::from(required_var(SECRET_KEY_ENV)?);
        let base_url = env::var(BASE_URL_ENV).ok().filter(|v| !v.trim().is_empty());

        Self::from_raw(&api_key, secret_key, base_url.as_deref())
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// `{base}/{path}`, keeping any path prefix on the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                Error::validation(format!("base url `{}` cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .push(path);
        Ok(url)
    }
}

fn required_var(name: &str) -> Result<String> {
    env::var(name).map_err(|e| Error::validation(format!("{name}: {e}")))
}
