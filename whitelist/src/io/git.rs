//! Git adapter for the repository backend.
//!
//! Whitelist changes are committed and pushed by a bot identity, so we keep a
//! small, explicit wrapper around `git` subprocess calls. Per-invocation
//! settings (the auth header) travel in `GIT_CONFIG_*` environment variables,
//! so they are neither written to the clone's config nor visible in the
//! process argument list.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument};

/// Commit author/committer identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

/// Wrapper for executing git commands in a working directory.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
    /// Settings applied to every invocation through the environment.
    config: Vec<(String, String)>,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            config: Vec::new(),
        }
    }

    /// Add a config override for every command this wrapper runs.
    pub fn with_config(mut self, key: &str, value: &str) -> Self {
        self.config.push((key.to_string(), value.to_string()));
        self
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Shallow-clone `url` into this wrapper's workdir (which must be empty or
    /// absent). The clone is run from the parent directory.
    #[instrument(skip_all, fields(dest = %self.workdir.display()))]
    pub fn clone_from(&self, url: &str) -> Result<()> {
        let parent = self
            .workdir
            .parent()
            .ok_or_else(|| anyhow!("clone target has no parent directory"))?;
        let dest = self.workdir.to_string_lossy().to_string();
        debug!("cloning repository");
        let output = self.command_in(parent, &["clone", "--depth", "1", "--", url, &dest])?;
        check(&["clone"], output)?;
        Ok(())
    }

    /// Return the current HEAD short SHA.
    pub fn head_short_sha(&self, len: usize) -> Result<String> {
        let arg = format!("--short={len}");
        let out = self.run_capture(&["rev-parse", &arg, "HEAD"])?;
        Ok(out.trim().to_string())
    }

    /// Stage all changes (respects .gitignore).
    pub fn add_all(&self) -> Result<()> {
        self.run_checked(&["add", "-A"])?;
        Ok(())
    }

    /// True if there is anything staged for commit.
    pub fn has_staged_changes(&self) -> Result<bool> {
        let out = self.run(&["diff", "--cached", "--name-only"])?;
        Ok(!String::from_utf8_lossy(&out.stdout).trim().is_empty())
    }

    /// Commit staged changes as `identity`.
    ///
    /// If there are no staged changes, this returns Ok(false) and does nothing.
    #[instrument(skip_all)]
    pub fn commit_staged(&self, message: &str, identity: &Identity) -> Result<bool> {
        if !self.has_staged_changes()? {
            debug!("no staged changes, skipping commit");
            return Ok(false);
        }
        debug!(author = %identity.name, "committing staged changes");
        let name = format!("user.name={}", identity.name);
        let email = format!("user.email={}", identity.email);
        self.run_checked(&["-c", &name, "-c", &email, "commit", "-m", message])?;
        Ok(true)
    }

    /// Push the checked-out branch to `origin`.
    #[instrument(skip_all)]
    pub fn push(&self) -> Result<()> {
        debug!("pushing to origin");
        self.run_checked(&["push", "origin", "HEAD"])?;
        Ok(())
    }

    fn run_capture(&self, args: &[&str]) -> Result<String> {
        let output = self.run_checked(args)?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn run_checked(&self, args: &[&str]) -> Result<Output> {
        let output = self.run(args)?;
        check(args, output)
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        self.command_in(&self.workdir, args)
    }

    fn command_in(&self, dir: &Path, args: &[&str]) -> Result<Output> {
        self.command(dir, args)
            .output()
            .with_context(|| format!("spawn git {}", subcommand(args)))
    }

    fn command(&self, dir: &Path, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.args(args)
            .current_dir(dir)
            // Never block on an interactive credential prompt.
            .env("GIT_TERMINAL_PROMPT", "0");
        if !self.config.is_empty() {
            cmd.env("GIT_CONFIG_COUNT", self.config.len().to_string());
            for (index, (key, value)) in self.config.iter().enumerate() {
                cmd.env(format!("GIT_CONFIG_KEY_{index}"), key)
                    .env(format!("GIT_CONFIG_VALUE_{index}"), value);
            }
        }
        cmd
    }
}

fn check(args: &[&str], output: Output) -> Result<Output> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("git {} failed: {}", subcommand(args), stderr.trim()));
    }
    Ok(output)
}

/// First non-flag argument, so error text never echoes URLs or header values.
fn subcommand<'a>(args: &[&'a str]) -> &'a str {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if *arg == "-c" {
            iter.next();
            continue;
        }
        return arg;
    }
    "<none>"
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const SECRET_HEADER: &str = "Authorization: Basic c2VjcmV0";

    fn init_repo(path: &Path) -> Git {
        let git = Git::new(path);
        git.run_checked(&["init", "-q"]).expect("git init");
        git
    }

    fn identity() -> Identity {
        Identity {
            name: "Test Bot".to_string(),
            email: "bot@local.invalid".to_string(),
        }
    }

    #[test]
    fn subcommand_skips_config_pairs() {
        assert_eq!(subcommand(&["-c", "a=b", "commit", "-m", "x"]), "commit");
        assert_eq!(subcommand(&["push", "origin", "HEAD"]), "push");
        assert_eq!(subcommand(&[]), "<none>");
    }

    #[test]
    fn commit_staged_uses_given_identity() {
        let temp = tempfile::tempdir().expect("tempdir");
        let git = init_repo(temp.path());
        fs::write(temp.path().join("a.json"), "{}").expect("write");
        git.add_all().expect("add");
        assert!(git.commit_staged("seed", &identity()).expect("commit"));

        let author = git
            .run_capture(&["log", "-1", "--format=%an <%ae>"])
            .expect("log");
        assert_eq!(author.trim(), "Test Bot <bot@local.invalid>");
    }

    #[test]
    fn commit_staged_without_changes_is_noop() {
        let temp = tempfile::tempdir().expect("tempdir");
        let git = init_repo(temp.path());
        assert!(!git.commit_staged("nothing", &identity()).expect("commit"));
    }

    #[test]
    fn config_overrides_stay_out_of_argv() {
        let temp = tempfile::tempdir().expect("tempdir");
        let git = init_repo(temp.path()).with_config("http.extraHeader", SECRET_HEADER);

        let seen = git
            .run_capture(&["config", "--get", "http.extraHeader"])
            .expect("config get");
        assert_eq!(seen.trim(), SECRET_HEADER);

        let cmd = git.command(temp.path(), &["push", "origin", "HEAD"]);
        assert!(
            cmd.get_args()
                .all(|arg| !arg.to_string_lossy().contains("c2VjcmV0"))
        );
        assert!(cmd.get_envs().any(|(key, value)| {
            key == "GIT_CONFIG_VALUE_0" && value.is_some_and(|value| value == SECRET_HEADER)
        }));
    }

    #[test]
    fn failures_do_not_echo_arguments() {
        let temp = tempfile::tempdir().expect("tempdir");
        let git = Git::new(temp.path().join("clone")).with_config("http.extraHeader", SECRET_HEADER);
        let err = git
            .clone_from(&temp.path().join("missing").to_string_lossy())
            .unwrap_err();
        let text = format!("{err:#}");
        assert!(text.starts_with("git clone failed"), "{text}");
        assert!(!text.contains("c2VjcmV0"));
    }
}
