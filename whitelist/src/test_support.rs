//! Test-only doubles: an in-memory backend and a local bare git remote.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tempfile::TempDir;

use crate::core::command::{Action, EosId, Location, Target, WhitelistCommand};
use crate::core::document::Whitelist;
use crate::io::backend::Backend;
use crate::io::credentials::RepoCredentials;
use crate::io::error::StoreError;

type ErrorFactory = Box<dyn Fn() -> StoreError + Send + Sync>;

/// Build an unscoped command.
pub fn command(action: Action, eos_id: &str) -> WhitelistCommand {
    WhitelistCommand::new(
        action,
        EosId::new(eos_id).expect("valid eos id"),
        Target::Default,
    )
}

/// Backend holding documents in memory and counting calls.
#[derive(Default)]
pub struct MemoryBackend {
    documents: Mutex<HashMap<Target, Whitelist>>,
    locations: Vec<Location>,
    fetch_error: Mutex<Option<ErrorFactory>>,
    store_error: Mutex<Option<ErrorFactory>>,
    fetch_delay: Duration,
    fetch_calls: AtomicUsize,
    store_calls: AtomicUsize,
}

impl MemoryBackend {
    pub fn with_document(target: Target, doc: Whitelist) -> Self {
        let backend = Self::default();
        backend.put(target, doc);
        backend
    }

    /// Advertise these locations from [`Backend::locations`].
    pub fn with_locations(mut self, locations: Vec<Location>) -> Self {
        self.locations = locations;
        self
    }

    /// Sleep inside every fetch to widen race windows.
    pub fn with_fetch_delay_ms(mut self, millis: u64) -> Self {
        self.fetch_delay = Duration::from_millis(millis);
        self
    }

    pub fn put(&self, target: Target, doc: Whitelist) {
        self.documents
            .lock()
            .expect("documents lock")
            .insert(target, doc);
    }

    /// Current document at `target` (empty if never stored).
    pub fn document(&self, target: &Target) -> Whitelist {
        self.documents
            .lock()
            .expect("documents lock")
            .get(target)
            .cloned()
            .unwrap_or_default()
    }

    pub fn fail_fetch(&self, make: impl Fn() -> StoreError + Send + Sync + 'static) {
        *self.fetch_error.lock().expect("fetch error lock") = Some(Box::new(make));
    }

    pub fn fail_store(&self, make: impl Fn() -> StoreError + Send + Sync + 'static) {
        *self.store_error.lock().expect("store error lock") = Some(Box::new(make));
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn store_calls(&self) -> usize {
        self.store_calls.load(Ordering::SeqCst)
    }
}

impl Backend for MemoryBackend {
    fn fetch(&self, target: &Target) -> Result<Whitelist, StoreError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(make) = self.fetch_error.lock().expect("fetch error lock").as_ref() {
            return Err(make());
        }
        if !self.fetch_delay.is_zero() {
            thread::sleep(self.fetch_delay);
        }
        Ok(self.document(target))
    }

    fn store(&self, target: &Target, doc: &Whitelist, _message: &str) -> Result<(), StoreError> {
        self.store_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(make) = self.store_error.lock().expect("store error lock").as_ref() {
            return Err(make());
        }
        self.put(target.clone(), doc.clone());
        Ok(())
    }

    fn locations(&self) -> Result<Vec<Location>, StoreError> {
        Ok(self.locations.clone())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Bare git repository in a temp dir, usable as a push target.
pub struct TestRemote {
    dir: TempDir,
}

impl TestRemote {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("tempdir")?;
        run_git(dir.path(), &["init", "-q", "--bare", "remote.git"])?;
        Ok(Self { dir })
    }

    pub fn url(&self) -> String {
        self.bare_path().to_string_lossy().to_string()
    }

    pub fn credentials(&self) -> RepoCredentials {
        RepoCredentials::new(self.url(), "bot", "test-token")
    }

    /// Commit `files` (relative path, contents) on top of the remote's HEAD.
    pub fn seed(&self, files: &[(&str, &str)]) -> Result<()> {
        let work = self.dir.path().join("seed");
        if work.exists() {
            fs::remove_dir_all(&work).context("clear seed checkout")?;
        }
        run_git(
            self.dir.path(),
            &["clone", "-q", &self.url(), &work.to_string_lossy()],
        )?;
        for (relative, contents) in files {
            let path = work.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).context("create seed dir")?;
            }
            fs::write(&path, contents).with_context(|| format!("write {relative}"))?;
        }
        run_git(&work, &["add", "-A"])?;
        run_git(
            &work,
            &[
                "-c",
                "user.name=Seeder",
                "-c",
                "user.email=seeder@local.invalid",
                "commit",
                "-q",
                "-m",
                "seed",
            ],
        )?;
        run_git(&work, &["push", "-q", "origin", "HEAD"])?;
        Ok(())
    }

    /// Install a `pre-receive` hook that refuses every push.
    #[cfg(unix)]
    pub fn reject_pushes(&self) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let hook = self.bare_path().join("hooks").join("pre-receive");
        fs::create_dir_all(hook.parent().context("hook dir")?).context("create hooks dir")?;
        fs::write(&hook, "#!/bin/sh\necho 'pushes are frozen' >&2\nexit 1\n")
            .context("write hook")?;
        fs::set_permissions(&hook, fs::Permissions::from_mode(0o755)).context("chmod hook")?;
        Ok(())
    }

    /// File contents at the remote's HEAD, or `None` if absent.
    pub fn read(&self, relative: &str) -> Result<Option<String>> {
        let spec = format!("HEAD:{relative}");
        let output = Command::new("git")
            .args(["show", &spec])
            .current_dir(self.bare_path())
            .output()
            .context("spawn git show")?;
        if !output.status.success() {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&output.stdout).to_string()))
    }

    /// Number of commits reachable from the remote's HEAD.
    pub fn commit_count(&self) -> Result<usize> {
        let out = run_git(&self.bare_path(), &["rev-list", "--count", "HEAD"])?;
        out.trim().parse().context("parse commit count")
    }

    /// `name <email>` of the latest commit author.
    pub fn head_author(&self) -> Result<String> {
        let out = run_git(&self.bare_path(), &["log", "-1", "--format=%an <%ae>"])?;
        Ok(out.trim().to_string())
    }

    fn bare_path(&self) -> PathBuf {
        self.dir.path().join("remote.git")
    }
}

fn run_git(root: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(root)
        .output()
        .with_context(|| format!("run git {:?}", args))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git {:?} failed: {}", args, stderr.trim());
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
