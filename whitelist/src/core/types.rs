//! Shared outcome types for whitelist commands.
//!
//! These types are the contract between the core and the adapters. They carry
//! no I/O handles and serialize to stable lowercase tags.

use serde::{Deserialize, Serialize};

/// Outcome of a single command invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "disposition", content = "detail", rename_all = "snake_case")]
pub enum Disposition {
    Added,
    Removed,
    /// `add` of an identifier that is already listed. Nothing was written.
    AlreadyPresent,
    /// `remove` of an identifier that is not listed. Nothing was written.
    NotPresent,
    /// Backend, decode, or validation failure. Nothing was written.
    Error(String),
}

impl Disposition {
    /// Added or Removed.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Added | Self::Removed)
    }

    /// Expected negative outcome: a user-facing refusal, not a system fault.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::AlreadyPresent | Self::NotPresent)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::AlreadyPresent => "already_present",
            Self::NotPresent => "not_present",
            Self::Error(_) => "error",
        }
    }
}
