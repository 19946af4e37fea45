//! User-facing acknowledgments for whitelist commands.

use serde::Serialize;

use crate::core::command::{CommandError, WhitelistCommand};
use crate::core::types::Disposition;

/// Panel color for successful changes.
pub const SUCCESS_COLOR: u32 = 0x57_F2_87;
/// Panel color for refusals and errors.
pub const FAILURE_COLOR: u32 = 0xED_42_45;

/// One reply per invocation, whatever happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acknowledgment {
    #[serde(flatten)]
    pub disposition: Disposition,
    pub success: bool,
    pub color: u32,
    pub message: String,
}

impl Acknowledgment {
    pub fn for_outcome(command: &WhitelistCommand, disposition: Disposition) -> Self {
        let id = &command.eos_id;
        let target = &command.target;
        let message = match &disposition {
            Disposition::Added => format!("Added `{id}` to the {target} whitelist."),
            Disposition::Removed => format!("Removed `{id}` from the {target} whitelist."),
            Disposition::AlreadyPresent => {
                format!("`{id}` is already in the {target} whitelist.")
            }
            Disposition::NotPresent => format!("`{id}` is not in the {target} whitelist."),
            Disposition::Error(detail) => format!("Could not update the whitelist: {detail}"),
        };
        Self::new(disposition, message)
    }

    /// Reply for a command that failed validation before reaching a backend.
    pub fn invalid(err: &CommandError) -> Self {
        let detail = err.to_string();
        let message = format!("Invalid command: {detail}");
        Self::new(Disposition::Error(detail), message)
    }

    fn new(disposition: Disposition, message: String) -> Self {
        let success = disposition.is_success();
        let color = if success { SUCCESS_COLOR } else { FAILURE_COLOR };
        Self {
            disposition,
            success,
            color,
            message,
        }
    }
}
