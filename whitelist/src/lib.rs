//! Exclusive-join whitelist management.
//!
//! A whitelist is a JSON document holding an `ExclusiveJoin` list of player
//! identifiers. Commands add or remove one identifier and persist the result
//! to a local file, a gist, or a git repository. The architecture enforces a
//! strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (document model, add/remove
//!   rules, command validation, location suggestions). No I/O.
//! - **[`io`]**: Side-effecting operations (config, credentials, git,
//!   persistence backends).
//!
//! [`service`] coordinates the two for one command; [`reply`] turns the
//! outcome into the acknowledgment shown to the invoker.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod reply;
pub mod service;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
