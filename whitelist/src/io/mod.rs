//! I/O helpers: configuration, credentials, and persistence backends.

pub mod backend;
pub mod config;
pub mod credentials;
pub mod error;
pub mod file_store;
pub mod gist;
pub mod git;
pub mod repo_store;
pub mod scan;
