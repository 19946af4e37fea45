//! Periodic location snapshot refresh.

use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use whitelist::core::locations::LocationSnapshot;

use crate::state::AppState;

/// Rebuild the snapshot once. A failed listing keeps the previous snapshot.
pub async fn refresh_once(state: &AppState) -> bool {
    let service = state.service.clone();
    match tokio::task::spawn_blocking(move || service.locations()).await {
        Ok(Ok(locations)) => {
            let snapshot = LocationSnapshot::new(locations);
            info!(count = snapshot.len(), "location snapshot refreshed");
            state.locations.replace(snapshot, Utc::now());
            true
        }
        Ok(Err(err)) => {
            warn!(
                error = %err,
                kind = err.kind(),
                "location refresh failed, keeping previous snapshot"
            );
            false
        }
        Err(err) => {
            warn!(error = %err, "location refresh task did not complete");
            false
        }
    }
}

/// Refresh immediately, then every `every`.
pub fn spawn_refresh(state: AppState, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            refresh_once(&state).await;
        }
    })
}
