//! Remote-document backend: the whitelist is one file inside a GitHub gist.

use std::collections::HashMap;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument, warn};

use crate::core::command::Target;
use crate::core::document::Whitelist;
use crate::io::backend::Backend;
use crate::io::config::GistConfig;
use crate::io::credentials::GistToken;
use crate::io::error::StoreError;

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("whitelist-bot/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct GistResponse {
    files: HashMap<String, Option<GistFile>>,
}

#[derive(Debug, Deserialize)]
struct GistFile {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    truncated: bool,
}

/// Gist-hosted whitelist. Only the default target is addressable.
#[derive(Debug, Clone)]
pub struct GistBackend {
    url: String,
    filename: String,
    token: GistToken,
}

impl GistBackend {
    pub fn new(cfg: &GistConfig, token: GistToken) -> Result<Self, StoreError> {
        if cfg.id.trim().is_empty() {
            return Err(StoreError::InvalidTarget("gist id is empty".to_string()));
        }
        let base = cfg.api_base.trim_end_matches('/');
        Ok(Self {
            url: format!("{base}/gists/{}", cfg.id),
            filename: cfg.filename.clone(),
            token,
        })
    }

    fn ensure_default(target: &Target) -> Result<(), StoreError> {
        match target {
            Target::Default => Ok(()),
            Target::At(location) => Err(StoreError::InvalidTarget(format!(
                "gist backend has no folders (got {location})"
            ))),
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(self.token.expose())
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .header("User-Agent", USER_AGENT)
    }
}

impl Backend for GistBackend {
    #[instrument(skip_all, fields(file = %self.filename))]
    fn fetch(&self, target: &Target) -> Result<Whitelist, StoreError> {
        Self::ensure_default(target)?;
        let client = Client::new();
        let response = self.authorized(client.get(&self.url)).send()?;
        let status = response.status();
        let body = response.text()?;
        check_status(status, &body)?;
        extract_whitelist(&body, &self.filename)
    }

    #[instrument(skip_all, fields(file = %self.filename, entries = doc.len()))]
    fn store(&self, target: &Target, doc: &Whitelist, _message: &str) -> Result<(), StoreError> {
        Self::ensure_default(target)?;
        let payload = update_payload(&self.filename, &doc.to_compact()?);
        let client = Client::new();
        let response = self
            .authorized(client.patch(&self.url))
            .json(&payload)
            .send()?;
        let status = response.status();
        let body = response.text()?;
        check_status(status, &body)?;
        debug!("gist updated");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "gist"
    }
}

/// `PATCH` body replacing one gist file's content.
fn update_payload(filename: &str, content: &str) -> serde_json::Value {
    json!({ "files": { filename: { "content": content } } })
}

fn check_status(status: StatusCode, body: &str) -> Result<(), StoreError> {
    if status.is_success() {
        return Ok(());
    }
    let detail = format!("gist API returned {status}: {}", first_line(body));
    warn!(%status, "gist request failed");
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Auth(detail),
        StatusCode::NOT_FOUND => StoreError::NotFound(detail),
        _ => StoreError::Transport(detail),
    })
}

/// Pull the whitelist out of a gist `GET` body. The named file must exist;
/// only its content may be blank.
fn extract_whitelist(body: &str, filename: &str) -> Result<Whitelist, StoreError> {
    let gist: GistResponse = serde_json::from_str(body)?;
    let Some(Some(file)) = gist.files.get(filename) else {
        return Err(StoreError::NotFound(format!("{filename} not found in gist")));
    };
    if file.truncated {
        return Err(StoreError::Decode(format!(
            "gist file {filename} is truncated"
        )));
    }
    Ok(Whitelist::decode(file.content.as_deref().unwrap_or_default())?)
}

fn first_line(body: &str) -> &str {
    body.lines().next().unwrap_or_default().trim()
}
