//! Deterministic, pure logic for whitelist commands.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod command;
pub mod document;
pub mod locations;
pub mod mutation;
pub mod types;
