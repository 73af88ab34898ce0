//! Persistence of the state cache: initial load, periodic dirty-checked flush.

use std::path::Path;
use std::time::{Duration, Instant};

use crate::kernel::services::ports::settings::MIN_SAVE_TIMER_MS;
use crate::kernel::services::ports::{StateStore, StoreError, StoreResult};
use crate::kernel::state::StateCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Live cache matches the last written snapshot; no I/O happened.
    Clean,
    Written { entries: usize },
    /// Logged; the snapshot is untouched so the next attempt retries.
    Failed,
}

#[derive(Debug, Clone)]
pub struct FlushScheduler {
    interval: Duration,
    next_due: Option<Instant>,
}

impl FlushScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: floor_interval(interval),
            next_due: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    /// Changing the interval restarts the period from `now`.
    pub fn set_interval(&mut self, interval: Duration, now: Instant) {
        self.interval = floor_interval(interval);
        if self.next_due.is_some() {
            self.start(now);
        }
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_due
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}

fn floor_interval(interval: Duration) -> Duration {
    interval.max(Duration::from_millis(MIN_SAVE_TIMER_MS))
}

/// Read the cache from the store. A missing or unreadable file yields an
/// empty cache.
pub fn load_cache(store: &dyn StateStore, db_path: &Path) -> StateCache {
    if !store.exists(db_path) {
        tracing::debug!(path = %db_path.display(), "no scroll positions stored yet");
        return StateCache::new();
    }
    match read_cache(store, db_path) {
        Ok(cache) => {
            tracing::info!(path = %db_path.display(), entries = cache.len(), "scroll positions loaded");
            cache
        }
        Err(e) => {
            tracing::warn!(path = %db_path.display(), error = %e, "failed to read scroll positions, starting empty");
            StateCache::new()
        }
    }
}

fn read_cache(store: &dyn StateStore, db_path: &Path) -> StoreResult<StateCache> {
    let bytes = store.read(db_path)?;
    Ok(StateCache::from_json(&bytes)?)
}

/// Write `live` if it differs from `shadow`, then make `shadow` a copy of it.
pub fn flush_cache(
    store: &dyn StateStore,
    db_path: &Path,
    live: &StateCache,
    shadow: &mut StateCache,
) -> FlushOutcome {
    let (live_json, shadow_json) = match (live.to_json(), shadow.to_json()) {
        (Ok(live), Ok(shadow)) => (live, shadow),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!(error = %e, "failed to serialize scroll positions");
            return FlushOutcome::Failed;
        }
    };
    if live_json == shadow_json {
        return FlushOutcome::Clean;
    }

    match write_snapshot(store, db_path, live_json.as_bytes()) {
        Ok(()) => {
            *shadow = live.clone();
            tracing::debug!(path = %db_path.display(), entries = live.len(), "scroll positions saved");
            FlushOutcome::Written {
                entries: live.len(),
            }
        }
        Err(e) => {
            tracing::error!(path = %db_path.display(), error = %e, "failed to save scroll positions");
            FlushOutcome::Failed
        }
    }
}

fn write_snapshot(store: &dyn StateStore, db_path: &Path, bytes: &[u8]) -> StoreResult<()> {
    if db_path.as_os_str().is_empty() {
        return Err(StoreError::InvalidPath(String::new()));
    }
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !store.exists(parent) {
            store.mkdir(parent)?;
        }
    }
    store.write(db_path, bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/flush.rs"]
mod tests;
