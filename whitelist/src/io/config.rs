//! Whitelist configuration stored in `whitelist.toml`.
//!
//! Secrets never live here; see [`crate::io::credentials`].

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "whitelist.toml";

/// Persistence strategy selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    File,
    Gist,
    #[default]
    Repo,
}

/// Top-level configuration (TOML). Missing fields take the defaults below.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WhitelistConfig {
    pub backend: BackendConfig,
    pub file: FileConfig,
    pub gist: GistConfig,
    pub repo: RepoConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileConfig {
    /// Default whitelist file. Scoped targets live in folders next to it.
    pub path: PathBuf,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("whitelist.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GistConfig {
    pub id: String,
    /// Gist sub-file holding the whitelist.
    pub filename: String,
    pub api_base: String,
}

impl Default for GistConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            filename: "whitelist.json".to_string(),
            api_base: "https://api.github.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RepoConfig {
    /// Path used when a command names no folder/file. Unset means every
    /// command must be scoped.
    pub default_path: Option<String>,
    /// Commit identity for bot-authored changes.
    pub author_name: String,
    pub author_email: String,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            default_path: None,
            author_name: "Whitelist Bot".to_string(),
            author_email: "whitelist-bot@users.noreply.github.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Seconds between location snapshot refreshes.
    pub refresh_interval_secs: u64,
    /// Serialize fetch-mutate-store per target. Off keeps last-writer-wins.
    pub serialize_writes: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 30 * 60,
            serialize_writes: false,
        }
    }
}

impl WhitelistConfig {
    pub fn validate(&self) -> Result<()> {
        match self.backend.kind {
            BackendKind::File => {
                if self.file.path.as_os_str().is_empty() {
                    return Err(anyhow!("file.path must be set for the file backend"));
                }
            }
            BackendKind::Gist => {
                if self.gist.id.trim().is_empty() {
                    return Err(anyhow!("gist.id must be set for the gist backend"));
                }
                if self.gist.filename.trim().is_empty() {
                    return Err(anyhow!("gist.filename must be non-empty"));
                }
            }
            BackendKind::Repo => {
                if let Some(path) = &self.repo.default_path {
                    validate_repo_path(path)?;
                }
                if self.repo.author_name.trim().is_empty()
                    || self.repo.author_email.trim().is_empty()
                {
                    return Err(anyhow!("repo.author_name and repo.author_email must be set"));
                }
            }
        }
        if self.server.refresh_interval_secs == 0 {
            return Err(anyhow!("server.refresh_interval_secs must be > 0"));
        }
        Ok(())
    }
}

fn validate_repo_path(path: &str) -> Result<()> {
    let escapes = path.split('/').any(|part| part.is_empty() || part == "." || part == "..");
    if escapes || path.starts_with(".git") {
        return Err(anyhow!("repo.default_path '{path}' must be a relative file path"));
    }
    Ok(())
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `WhitelistConfig::default()`.
pub fn load_config(path: &Path) -> Result<WhitelistConfig> {
    if !path.exists() {
        let cfg = WhitelistConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: WhitelistConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
