//! Typed whitelist command record.
//!
//! Adapters hand over a loosely typed [`RawCommand`] (CLI flags, HTTP JSON);
//! [`WhitelistCommand::parse`] validates it once so the rest of the crate only
//! sees well-formed values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failures for inbound commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("eos_id is required")]
    MissingEosId,
    #[error("unknown action '{0}' (expected add or remove)")]
    UnknownAction(String),
    #[error("folder and file must be given together")]
    IncompleteLocation,
    #[error("invalid {field} name '{value}'")]
    InvalidName { field: &'static str, value: String },
    #[error("folder and file are required when multiple whitelists exist")]
    LocationRequired,
    /// The command body could not be read as a command at all.
    #[error("malformed command: {0}")]
    Malformed(String),
}

/// Mutation requested by a command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[default]
    Add,
    Remove,
}

impl FromStr for Action {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" => Ok(Self::Add),
            "remove" => Ok(Self::Remove),
            _ => Err(CommandError::UnknownAction(s.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => f.write_str("add"),
            Self::Remove => f.write_str("remove"),
        }
    }
}

/// A player identifier as entered by the invoker. Never normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EosId(String);

impl EosId {
    pub fn new(raw: impl Into<String>) -> Result<Self, CommandError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(CommandError::MissingEosId);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EosId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A (folder, file) pair naming one whitelist document.
///
/// Both parts are single path components, so joining them under a root can
/// never escape it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub folder: String,
    pub file: String,
}

impl Location {
    pub fn new(folder: impl Into<String>, file: impl Into<String>) -> Result<Self, CommandError> {
        let folder = folder.into();
        let file = file.into();
        validate_component("folder", &folder)?;
        validate_component("file", &file)?;
        Ok(Self { folder, file })
    }

    /// Relative path inside a checkout, always `/`-separated.
    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.folder, self.file)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.folder, self.file)
    }
}

/// Which document a command addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Target {
    /// The backend's configured default document.
    #[default]
    Default,
    At(Location),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::At(location) => write!(f, "{location}"),
        }
    }
}

/// Unvalidated command options as they arrive from an adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCommand {
    pub action: Option<String>,
    pub eos_id: Option<String>,
    pub folder: Option<String>,
    pub file: Option<String>,
}

/// A validated whitelist command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitelistCommand {
    pub action: Action,
    pub eos_id: EosId,
    pub target: Target,
}

impl WhitelistCommand {
    pub fn new(action: Action, eos_id: EosId, target: Target) -> Self {
        Self {
            action,
            eos_id,
            target,
        }
    }

    /// Validate raw options. A missing action defaults to [`Action::Add`].
    pub fn parse(raw: &RawCommand) -> Result<Self, CommandError> {
        let action = match raw.action.as_deref() {
            Some(action) if !action.trim().is_empty() => action.parse()?,
            _ => Action::default(),
        };
        let eos_id = EosId::new(raw.eos_id.clone().unwrap_or_default())?;
        let target = parse_target(raw.folder.as_deref(), raw.file.as_deref())?;
        Ok(Self::new(action, eos_id, target))
    }

    /// Reject an unscoped command when the caller knows of several documents.
    pub fn require_scoped_if_ambiguous(&self, known_locations: usize) -> Result<(), CommandError> {
        if self.target == Target::Default && known_locations > 1 {
            return Err(CommandError::LocationRequired);
        }
        Ok(())
    }
}

/// Build a target from optional folder/file options (both or neither).
pub fn parse_target(folder: Option<&str>, file: Option<&str>) -> Result<Target, CommandError> {
    let folder = folder.filter(|value| !value.is_empty());
    let file = file.filter(|value| !value.is_empty());
    match (folder, file) {
        (None, None) => Ok(Target::Default),
        (Some(folder), Some(file)) => Ok(Target::At(Location::new(folder, file)?)),
        _ => Err(CommandError::IncompleteLocation),
    }
}

fn validate_component(field: &'static str, value: &str) -> Result<(), CommandError> {
    let invalid = value.trim().is_empty()
        || value.starts_with('.')
        || value.contains(['/', '\\'])
        || value.chars().any(char::is_control);
    if invalid {
        return Err(CommandError::InvalidName {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}
