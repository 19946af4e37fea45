//! Orchestration for a single whitelist command: fetch → mutate → store.
//!
//! Each call reads the document fresh from the backend; nothing is cached
//! between calls. Stores happen only when the mutation changed the document.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, instrument, warn};

use crate::core::command::{Action, Location, Target, WhitelistCommand};
use crate::core::document::Whitelist;
use crate::core::mutation::apply;
use crate::core::types::Disposition;
use crate::io::backend::Backend;
use crate::io::error::StoreError;

/// Per-target mutual exclusion for the fetch-mutate-store sequence.
///
/// Without it, two concurrent commands on the same target both read the same
/// document and the later store overwrites the earlier one.
#[derive(Debug, Default)]
pub struct TargetLocks {
    locks: Mutex<HashMap<Target, Arc<Mutex<()>>>>,
}

impl TargetLocks {
    /// Run `f` while holding the lock for `target`.
    ///
    /// The entry is dropped from the table once no other caller holds or
    /// waits on it, so the table only holds targets in use.
    pub fn with_lock<T>(&self, target: &Target, f: impl FnOnce() -> T) -> T {
        let lock = {
            let mut table = self.table();
            Arc::clone(table.entry(target.clone()).or_default())
        };
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };

        let mut table = self.table();
        // One reference in the table, one here.
        if Arc::strong_count(&lock) == 2 {
            table.remove(target);
        }
        result
    }

    /// Number of targets with a live lock entry.
    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn table(&self) -> MutexGuard<'_, HashMap<Target, Arc<Mutex<()>>>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Executes whitelist commands against a backend.
pub struct WhitelistService<B> {
    backend: B,
    locks: Option<TargetLocks>,
}

impl<B: Backend> WhitelistService<B> {
    /// Service with last-writer-wins semantics for concurrent commands.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            locks: None,
        }
    }

    /// Serialize commands that address the same target.
    pub fn with_serialized_writes(mut self) -> Self {
        self.locks = Some(TargetLocks::default());
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Run one command. Always returns a disposition; failures become
    /// [`Disposition::Error`] and leave the stored document untouched.
    #[instrument(skip_all, fields(action = %command.action, target = %command.target))]
    pub fn execute(&self, command: &WhitelistCommand) -> Disposition {
        let run = || self.fetch_mutate_store(command);
        let result = match &self.locks {
            Some(locks) => locks.with_lock(&command.target, run),
            None => run(),
        };
        match result {
            Ok(disposition) => {
                info!(disposition = disposition.tag(), "command handled");
                disposition
            }
            Err(err) => {
                warn!(kind = err.kind(), error = %err, "command failed");
                Disposition::Error(err.to_string())
            }
        }
    }

    /// Read the current document without mutating it.
    pub fn read(&self, target: &Target) -> Result<Whitelist, StoreError> {
        self.backend.fetch(target)
    }

    pub fn locations(&self) -> Result<Vec<Location>, StoreError> {
        self.backend.locations()
    }

    fn fetch_mutate_store(&self, command: &WhitelistCommand) -> Result<Disposition, StoreError> {
        let current = self.backend.fetch(&command.target)?;
        debug!(entries = current.len(), "whitelist fetched");

        let mutation = apply(&current, command.action, command.eos_id.as_str());
        if !mutation.changed() {
            debug!(disposition = mutation.disposition.tag(), "no change to persist");
            return Ok(mutation.disposition);
        }

        self.backend
            .store(&command.target, &mutation.document, &commit_message(command))?;
        Ok(mutation.disposition)
    }
}

/// Commit message for a whitelist change.
pub fn commit_message(command: &WhitelistCommand) -> String {
    match command.action {
        Action::Add => format!("Add {} to {} whitelist", command.eos_id, command.target),
        Action::Remove => {
            format!("Remove {} from {} whitelist", command.eos_id, command.target)
        }
    }
}
