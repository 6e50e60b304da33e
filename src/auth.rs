//! API credentials and request signing.
//!
//! Every call carries `api_key` and `sig`. The signature is the lowercase hex MD5 of
//! `secret + api_key + "json" + values`, where `values` is the concatenation of the
//! request parameter values ordered by their keys. The server recomputes it, so the
//! byte-wise key ordering must match exactly.

use std::collections::BTreeMap;
use std::fmt;

use md5::{Digest as _, Md5};
use secrecy::{ExposeSecret as _, SecretString};

/// Response format the signature template is bound to.
const SIGNATURE_FORMAT: &str = "json";

/// Immutable `(api_key, secret_key)` pair.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    secret: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(api_key: String, secret: SecretString) -> Self {
        Self { api_key, secret }
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Signs `params` with these credentials. See [`sign`].
    #[must_use]
    pub fn sign<'a, I>(&self, params: I) -> String
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        sign(self.secret.expose_secret(), &self.api_key, params)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Computes the request signature.
///
/// Parameter keys are sorted byte-wise before their values are concatenated, so the
/// result does not depend on iteration order. Keys themselves are not hashed. If a
/// key appears twice the last value wins.
#[must_use]
pub fn sign<'a, I>(secret: &str, api_key: &str, params: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let sorted: BTreeMap<&str, &str> = params.into_iter().collect();

    let mut hasher = Md5::new();
    hasher.update(secret.as_bytes());
    hasher.update(api_key.as_bytes());
    hasher.update(SIGNATURE_FORMAT.as_bytes());
    for value in sorted.values() {
        hasher.update(value.as_bytes());
    }

    format!("{:x}", hasher.finalize())
}
