use std::path::PathBuf;
use std::time::Instant;

use super::detector::{check_changed, ChangeDetector, Evaluation};
use super::flush::{flush_cache, load_cache, FlushOutcome, FlushScheduler};
use super::lifecycle::{LifecycleCoordinator, OpenOutcome, RestoreStep};
use super::services::ports::{HostWorkspace, Settings, StateStore};
use super::state::{LifecycleState, StateCache};
use super::{Action, Effect};

#[derive(Debug, Default)]
pub struct DispatchResult {
    pub effects: Vec<Effect>,
    /// The state cache was modified.
    pub state_changed: bool,
}

impl DispatchResult {
    fn merge(&mut self, other: DispatchResult) {
        self.effects.extend(other.effects);
        self.state_changed |= other.state_changed;
    }
}

/// Scroll-position synchronization engine.
///
/// Everything runs on the caller's thread. Time is passed in; the engine never
/// reads the clock, and the caller is expected to call [`Engine::tick`] no later
/// than [`Engine::next_deadline`].
pub struct Engine {
    settings: Settings,
    store: Box<dyn StateStore>,
    cache: StateCache,
    shadow: StateCache,
    lifecycle: LifecycleState,
    coordinator: LifecycleCoordinator,
    detector: ChangeDetector,
    flusher: FlushScheduler,
    stopped: bool,
}

impl Engine {
    pub fn new(settings: Settings, store: Box<dyn StateStore>, now: Instant) -> Self {
        let settings = settings.normalized();
        let cache = load_cache(store.as_ref(), &settings.db_path());
        let shadow = cache.clone();
        let mut flusher = FlushScheduler::new(settings.save_interval());
        flusher.start(now);

        Self {
            coordinator: LifecycleCoordinator::new(settings.settle_delay()),
            settings,
            store,
            cache,
            shadow,
            lifecycle: LifecycleState::default(),
            detector: ChangeDetector::new(),
            flusher,
            stopped: false,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cache(&self) -> &StateCache {
        &self.cache
    }

    /// Snapshot of what was last written.
    pub fn shadow(&self) -> &StateCache {
        &self.shadow
    }

    pub fn lifecycle(&self) -> &LifecycleState {
        &self.lifecycle
    }

    pub fn coordinator(&self) -> &LifecycleCoordinator {
        &self.coordinator
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn db_path(&self) -> PathBuf {
        self.settings.db_path()
    }

    pub fn dispatch(
        &mut self,
        action: Action,
        host: &dyn HostWorkspace,
        now: Instant,
    ) -> DispatchResult {
        if self.stopped {
            return DispatchResult::default();
        }

        match action {
            Action::FileOpen | Action::LayoutReady => {
                let outcome =
                    self.coordinator
                        .on_open(&mut self.lifecycle, &self.cache, host, now);
                tracing::trace!(?outcome, path = ?host.active_path(), "document opened");
                if outcome == OpenOutcome::RestoreScheduled {
                    return self.advance_restore(host, now);
                }
                DispatchResult::default()
            }
            Action::Rename { from, to } => {
                let changed = self.cache.contains(&from) || self.cache.contains(&to);
                self.coordinator
                    .on_rename(&mut self.lifecycle, &mut self.cache, &from, &to);
                tracing::debug!(from = %from, to = %to, "document renamed");
                DispatchResult {
                    effects: Vec::new(),
                    state_changed: changed,
                }
            }
            Action::Delete { path } => {
                let changed = self.cache.contains(&path);
                self.coordinator
                    .on_delete(&mut self.lifecycle, &mut self.cache, &path);
                tracing::debug!(path = %path, "document deleted");
                DispatchResult {
                    effects: Vec::new(),
                    state_changed: changed,
                }
            }
            Action::Quit => {
                self.shutdown();
                DispatchResult::default()
            }
            Action::Scroll | Action::Wheel => {
                self.detector.on_scroll(now);
                DispatchResult::default()
            }
            Action::Key(key) => {
                self.detector.on_key(&key, now);
                DispatchResult::default()
            }
        }
    }

    /// Run whatever timers have expired at `now`.
    pub fn tick(&mut self, host: &dyn HostWorkspace, now: Instant) -> DispatchResult {
        if self.stopped {
            return DispatchResult::default();
        }

        let mut result = self.advance_restore(host, now);

        if self.detector.poll(now) {
            let evaluation = check_changed(&mut self.lifecycle, &mut self.cache, host);
            if let Evaluation::Changed(state) = evaluation {
                tracing::trace!(path = ?host.active_path(), scroll = ?state.scroll, "scroll position changed");
                result.merge(DispatchResult {
                    effects: Vec::new(),
                    state_changed: true,
                });
            }
        }

        if self.flusher.poll(now) {
            self.flush();
        }

        result
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        if self.stopped {
            return None;
        }
        [
            self.coordinator.next_deadline(),
            self.detector.next_deadline(),
            self.flusher.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    pub fn flush(&mut self) -> FlushOutcome {
        flush_cache(
            self.store.as_ref(),
            &self.settings.db_path(),
            &self.cache,
            &mut self.shadow,
        )
    }

    /// Apply new settings. A new store file gets the full cache on the next flush.
    pub fn update_settings(&mut self, settings: Settings, now: Instant) {
        let settings = settings.normalized();
        if settings == self.settings {
            return;
        }

        if settings.db_path() != self.settings.db_path() {
            self.shadow = StateCache::new();
        }
        self.coordinator.set_settle_delay(settings.settle_delay());
        if settings.save_interval() != self.flusher.interval() {
            self.flusher.set_interval(settings.save_interval(), now);
        }
        tracing::info!(
            db_file_name = %settings.db_file_name,
            delay_after_file_opening = settings.delay_after_file_opening,
            save_timer = settings.save_timer,
            "settings updated"
        );
        self.settings = settings;
    }

    /// Final flush, then cancel every pending timer. Idempotent.
    pub fn shutdown(&mut self) -> FlushOutcome {
        if self.stopped {
            return FlushOutcome::Clean;
        }
        let outcome = self.flush();
        self.coordinator.cancel(&mut self.lifecycle);
        self.detector.cancel_all();
        self.flusher.stop();
        self.stopped = true;
        tracing::info!(?outcome, "scroll tracking stopped");
        outcome
    }

    fn advance_restore(&mut self, host: &dyn HostWorkspace, now: Instant) -> DispatchResult {
        let mut result = DispatchResult::default();
        if let RestoreStep::Applied(effect) = self.coordinator.poll(&mut self.lifecycle, host, now)
        {
            result.effects.push(effect);
        }
        result
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/engine.rs"]
mod tests;
