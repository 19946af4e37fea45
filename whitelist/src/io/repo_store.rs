//! Versioned-repository backend.
//!
//! Every call clones the repository into a fresh temporary directory, works
//! on the checkout, and drops the directory on return (success or not). No
//! clone outlives a call.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tempfile::TempDir;
use tracing::{debug, info, instrument, warn};

use crate::core::command::{Location, Target};
use crate::core::document::Whitelist;
use crate::io::backend::Backend;
use crate::io::config::RepoConfig;
use crate::io::credentials::RepoCredentials;
use crate::io::error::StoreError;
use crate::io::git::{Git, Identity};
use crate::io::scan::scan_locations;

/// Substrings git prints when credentials are missing or rejected.
const AUTH_MARKERS: [&str; 5] = [
    "authentication failed",
    "could not read username",
    "could not read password",
    "returned error: 401",
    "returned error: 403",
];

/// Git repository holding one whitelist file per `<folder>/<file>`.
#[derive(Debug, Clone)]
pub struct RepoBackend {
    credentials: RepoCredentials,
    default_path: Option<String>,
    identity: Identity,
}

/// A temporary clone. The directory is removed when this is dropped.
struct Checkout {
    _dir: TempDir,
    git: Git,
}

impl Checkout {
    fn path_of(&self, relative: &str) -> PathBuf {
        self.git.workdir().join(relative)
    }
}

impl RepoBackend {
    pub fn new(cfg: &RepoConfig, credentials: RepoCredentials) -> Self {
        Self {
            credentials,
            default_path: cfg.default_path.clone(),
            identity: Identity {
                name: cfg.author_name.clone(),
                email: cfg.author_email.clone(),
            },
        }
    }

    fn relative_path(&self, target: &Target) -> Result<String, StoreError> {
        match target {
            Target::At(location) => Ok(location.relative_path()),
            Target::Default => self.default_path.clone().ok_or_else(|| {
                StoreError::InvalidTarget(
                    "folder and file are required (no default path configured)".to_string(),
                )
            }),
        }
    }

    #[instrument(skip_all)]
    fn checkout(&self) -> Result<Checkout, StoreError> {
        let dir = tempfile::Builder::new().prefix("whitelist-").tempdir()?;
        let git = Git::new(dir.path().join("repo"))
            .with_config("http.extraHeader", &self.credentials.basic_auth_header());
        git.clone_from(&self.credentials.url)
            .map_err(|err| self.git_error(err))?;
        debug!(path = %git.workdir().display(), "repository cloned");
        Ok(Checkout { _dir: dir, git })
    }

    /// Classify a git failure and scrub the token from its text.
    fn git_error(&self, err: anyhow::Error) -> StoreError {
        let text = format!("{err:#}").replace(self.credentials.token(), "<redacted>");
        let lower = text.to_lowercase();
        if AUTH_MARKERS.iter().any(|marker| lower.contains(marker)) {
            warn!("git rejected repository credentials");
            return StoreError::Auth(text);
        }
        StoreError::Transport(text)
    }
}

impl Backend for RepoBackend {
    #[instrument(skip_all, fields(target = %target))]
    fn fetch(&self, target: &Target) -> Result<Whitelist, StoreError> {
        let relative = self.relative_path(target)?;
        let checkout = self.checkout()?;
        let path = checkout.path_of(&relative);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Whitelist::decode(&contents)?),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %relative, "whitelist file absent in repository, treating as empty");
                Ok(Whitelist::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    #[instrument(skip_all, fields(target = %target, entries = doc.len()))]
    fn store(&self, target: &Target, doc: &Whitelist, message: &str) -> Result<(), StoreError> {
        let relative = self.relative_path(target)?;
        let checkout = self.checkout()?;
        let path = checkout.path_of(&relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, doc.to_pretty()?)?;

        let git = &checkout.git;
        git.add_all().map_err(|err| self.git_error(err))?;
        let committed = git
            .commit_staged(message, &self.identity)
            .map_err(|err| self.git_error(err))?;
        if !committed {
            debug!("whitelist unchanged in repository, nothing to push");
            return Ok(());
        }
        git.push().map_err(|err| self.git_error(err))?;
        let sha = git.head_short_sha(8).unwrap_or_default();
        info!(path = %relative, commit = %sha, "whitelist pushed");
        Ok(())
    }

    fn locations(&self) -> Result<Vec<Location>, StoreError> {
        let checkout = self.checkout()?;
        scan_locations(checkout.git.workdir())
            .map_err(|err| StoreError::Io(std::io::Error::other(format!("{err:#}"))))
    }

    fn name(&self) -> &'static str {
        "repo"
    }
}
