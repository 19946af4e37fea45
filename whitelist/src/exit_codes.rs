//! Stable exit codes for the `whitelist` CLI.

use crate::core::types::Disposition;

/// Identifier added or removed, or a read-only command succeeded.
pub const OK: i32 = 0;
/// Invalid command/config or backend failure. Nothing was written.
pub const FAILED: i32 = 1;
/// Identifier already present (add) or absent (remove). Nothing was written.
pub const REJECTED: i32 = 2;

pub fn for_disposition(disposition: &Disposition) -> i32 {
    match disposition {
        Disposition::Added | Disposition::Removed => OK,
        Disposition::AlreadyPresent | Disposition::NotPresent => REJECTED,
        Disposition::Error(_) => FAILED,
    }
}
