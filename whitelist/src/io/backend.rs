//! Persistence backend abstraction.
//!
//! The [`Backend`] trait decouples command orchestration from where the
//! whitelist actually lives (local file, gist, git repository). Tests use an
//! in-memory backend that records every call.

use tracing::info;

use crate::core::command::{Location, Target};
use crate::core::document::Whitelist;
use crate::io::config::{BackendKind, WhitelistConfig};
use crate::io::credentials::{GistToken, RepoCredentials};
use crate::io::error::StoreError;
use crate::io::file_store::FileBackend;
use crate::io::gist::GistBackend;
use crate::io::repo_store::RepoBackend;

/// Fetch/store contract shared by every persistence strategy.
pub trait Backend: Send + Sync {
    /// Read the current document. Absent content yields an empty whitelist.
    fn fetch(&self, target: &Target) -> Result<Whitelist, StoreError>;

    /// Replace the document at `target` with `doc`, whole.
    fn store(&self, target: &Target, doc: &Whitelist, message: &str) -> Result<(), StoreError>;

    /// Known scoped locations. Backends without folders return none.
    fn locations(&self) -> Result<Vec<Location>, StoreError> {
        Ok(Vec::new())
    }

    /// Short label for logs.
    fn name(&self) -> &'static str;
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn fetch(&self, target: &Target) -> Result<Whitelist, StoreError> {
        (**self).fetch(target)
    }

    fn store(&self, target: &Target, doc: &Whitelist, message: &str) -> Result<(), StoreError> {
        (**self).store(target, doc, message)
    }

    fn locations(&self) -> Result<Vec<Location>, StoreError> {
        (**self).locations()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Build the configured backend, reading credentials from the environment.
///
/// Missing credentials fail here, before any network call.
pub fn backend_from_config(cfg: &WhitelistConfig) -> Result<Box<dyn Backend>, StoreError> {
    let backend: Box<dyn Backend> = match cfg.backend.kind {
        BackendKind::File => Box::new(FileBackend::new(&cfg.file.path)),
        BackendKind::Gist => Box::new(GistBackend::new(&cfg.gist, GistToken::from_env()?)?),
        BackendKind::Repo => Box::new(RepoBackend::new(&cfg.repo, RepoCredentials::from_env()?)),
    };
    info!(backend = backend.name(), "backend configured");
    Ok(backend)
}
