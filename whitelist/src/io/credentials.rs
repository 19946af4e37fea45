//! Backend credentials read from the process environment.
//!
//! Every lookup goes through a caller-supplied function so tests can inject
//! values without touching the real environment.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::io::error::StoreError;

pub const REPO_URL_VAR: &str = "WHITELIST_REPO_URL";
pub const REPO_USERNAME_VAR: &str = "WHITELIST_REPO_USERNAME";
pub const REPO_TOKEN_VAR: &str = "WHITELIST_REPO_TOKEN";
pub const GIST_TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Read a variable from the real process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn require(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, StoreError> {
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or(StoreError::MissingCredential(name))
}

/// Repository URL plus basic-auth pair.
#[derive(Clone, PartialEq, Eq)]
pub struct RepoCredentials {
    pub url: String,
    pub username: String,
    token: String,
}

impl RepoCredentials {
    pub fn new(url: impl Into<String>, username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            token: token.into(),
        }
    }

    /// All three variables are required; the first missing one is reported.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StoreError> {
        Ok(Self {
            url: require(&lookup, REPO_URL_VAR)?,
            username: require(&lookup, REPO_USERNAME_VAR)?,
            token: require(&lookup, REPO_TOKEN_VAR)?,
        })
    }

    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_lookup(process_env)
    }

    /// Value for git's `http.extraHeader`.
    pub fn basic_auth_header(&self) -> String {
        let encoded = STANDARD.encode(format!("{}:{}", self.username, self.token));
        format!("Authorization: Basic {encoded}")
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for RepoCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepoCredentials")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Bearer token for the gist API.
#[derive(Clone, PartialEq, Eq)]
pub struct GistToken(String);

impl GistToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StoreError> {
        require(&lookup, GIST_TOKEN_VAR).map(Self)
    }

    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_lookup(process_env)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for GistToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GistToken(<redacted>)")
    }
}
