//! Shared application state for the whitelist server.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use whitelist::core::locations::LocationSnapshot;
use whitelist::io::backend::Backend;
use whitelist::service::WhitelistService;

pub type DynService = WhitelistService<Box<dyn Backend>>;

/// A location snapshot plus the time it was taken.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshedLocations {
    #[serde(flatten)]
    pub snapshot: LocationSnapshot,
    /// `None` until the first successful refresh.
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Current snapshot behind a lock held only long enough to clone the `Arc`.
///
/// Readers never see a half-built snapshot: a refresh builds a new one and
/// swaps the pointer.
#[derive(Debug, Default)]
pub struct LocationCache {
    current: RwLock<Arc<RefreshedLocations>>,
}

impl LocationCache {
    pub fn load(&self) -> Arc<RefreshedLocations> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn replace(&self, snapshot: LocationSnapshot, refreshed_at: DateTime<Utc>) {
        let next = Arc::new(RefreshedLocations {
            snapshot,
            refreshed_at: Some(refreshed_at),
        });
        match self.current.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}

/// Shared state accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DynService>,
    pub locations: Arc<LocationCache>,
}

impl AppState {
    pub fn new(service: DynService) -> Self {
        Self {
            service: Arc::new(service),
            locations: Arc::new(LocationCache::default()),
        }
    }
}
