//! Document lifecycle: guarded restore on open, cache key maintenance on
//! rename/delete.
//!
//! A restore runs in two phases. `Settling` waits for the host to lay the
//! document out, then checks for a link-target highlight; `Applying` waits a
//! little longer and re-validates the active document before emitting the
//! scroll. Other events may interleave between phases.

use std::time::{Duration, Instant};

use crate::kernel::effect::Effect;
use crate::kernel::services::ports::HostWorkspace;
use crate::kernel::state::{EphemeralState, LifecycleState, StateCache};

pub const APPLY_SETTLE: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestorePhase {
    Settling,
    Applying,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingRestore {
    pub path: String,
    pub saved: EphemeralState,
    pub phase: RestorePhase,
    pub deadline: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Same document is already mid-restore.
    Duplicate,
    /// The focused view was handled on a previous pass.
    AlreadyHandled,
    SameDocument,
    NoDocument,
    NothingSaved,
    RestoreScheduled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RestoreStep {
    Idle,
    Waiting,
    /// Settling finished; the apply phase is scheduled.
    Advanced,
    /// The host is scrolling to a link target; this pass restores nothing.
    Deferred,
    /// The view moved on to another document during the settle delay.
    Stale,
    NothingToApply,
    Applied(Effect),
}

#[derive(Debug, Clone)]
pub struct LifecycleCoordinator {
    settle_delay: Duration,
    pending: Option<PendingRestore>,
}

impl LifecycleCoordinator {
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            settle_delay,
            pending: None,
        }
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    pub fn set_settle_delay(&mut self, delay: Duration) {
        self.settle_delay = delay;
    }

    pub fn pending(&self) -> Option<&PendingRestore> {
        self.pending.as_ref()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub fn on_open(
        &mut self,
        state: &mut LifecycleState,
        cache: &StateCache,
        host: &dyn HostWorkspace,
        now: Instant,
    ) -> OpenOutcome {
        let active = host.active_path().map(str::to_owned);

        if state.loading && active.is_some() && active == state.last_loaded_path {
            return OpenOutcome::Duplicate;
        }

        if let Some(view) = host.most_recent_view() {
            if state.open_views.contains(&view) {
                // Nothing to restore, but keep tracking whatever is focused now.
                if active != state.last_loaded_path {
                    self.pending = None;
                    state.last_loaded_path = active;
                    state.baseline = None;
                    state.loading = false;
                }
                return OpenOutcome::AlreadyHandled;
            }
        }

        state.open_views = host.open_views().into_iter().collect();
        state.loading = true;

        if active == state.last_loaded_path {
            state.loading = false;
            return OpenOutcome::SameDocument;
        }

        self.pending = None;
        state.baseline = None;
        state.last_loaded_path = active.clone();

        let Some(path) = active else {
            state.loading = false;
            return OpenOutcome::NoDocument;
        };

        match cache.get(&path).copied() {
            Some(saved) => {
                tracing::debug!(path = %path, scroll = ?saved.scroll, "restore scheduled");
                self.pending = Some(PendingRestore {
                    path,
                    saved,
                    phase: RestorePhase::Settling,
                    deadline: now + self.settle_delay,
                });
                OpenOutcome::RestoreScheduled
            }
            None => {
                state.loading = false;
                OpenOutcome::NothingSaved
            }
        }
    }

    /// Advance the in-flight restore if its deadline passed.
    pub fn poll(
        &mut self,
        state: &mut LifecycleState,
        host: &dyn HostWorkspace,
        now: Instant,
    ) -> RestoreStep {
        let Some(pending) = self.pending.as_mut() else {
            return RestoreStep::Idle;
        };
        if now < pending.deadline {
            return RestoreStep::Waiting;
        }

        let phase = pending.phase;
        match phase {
            RestorePhase::Settling => {
                if host.has_flashing_marker() {
                    tracing::debug!(path = %pending.path, "link target highlighted, restore skipped");
                    self.finish(state);
                    return RestoreStep::Deferred;
                }
                pending.phase = RestorePhase::Applying;
                pending.deadline = now + APPLY_SETTLE;
                RestoreStep::Advanced
            }
            RestorePhase::Applying => {
                let Some(done) = self.finish(state) else {
                    return RestoreStep::Idle;
                };
                if host.active_path() != Some(done.path.as_str()) {
                    tracing::debug!(path = %done.path, "active document changed, restore dropped");
                    return RestoreStep::Stale;
                }
                match done.saved.scroll {
                    Some(scroll) => {
                        tracing::debug!(path = %done.path, scroll, "restoring scroll position");
                        RestoreStep::Applied(Effect::SetScroll {
                            path: done.path,
                            scroll,
                        })
                    }
                    None => RestoreStep::NothingToApply,
                }
            }
        }
    }

    pub fn on_rename(
        &mut self,
        state: &mut LifecycleState,
        cache: &mut StateCache,
        from: &str,
        to: &str,
    ) {
        cache.rename(from, to);

        if state.last_loaded_path.as_deref() == Some(from) {
            state.last_loaded_path = Some(to.to_string());
        }
        if let Some(pending) = self.pending.as_mut().filter(|p| p.path == from) {
            pending.path = to.to_string();
        }
        state.open_views = state
            .open_views
            .drain()
            .map(|mut view| {
                if view.document.as_deref() == Some(from) {
                    view.document = Some(to.to_string());
                }
                view
            })
            .collect();
    }

    pub fn on_delete(&mut self, state: &mut LifecycleState, cache: &mut StateCache, path: &str) {
        cache.remove(path);

        if self.pending.as_ref().is_some_and(|p| p.path == path) {
            self.pending = None;
        }
        if state.last_loaded_path.as_deref() == Some(path) {
            state.clear_document();
        }
        state
            .open_views
            .retain(|view| view.document.as_deref() != Some(path));
    }

    /// Drop any in-flight restore.
    pub fn cancel(&mut self, state: &mut LifecycleState) {
        self.pending = None;
        state.loading = false;
    }

    fn finish(&mut self, state: &mut LifecycleState) -> Option<PendingRestore> {
        let done = self.pending.take()?;
        if state.last_loaded_path.as_deref() == Some(done.path.as_str()) {
            state.baseline = Some(done.saved);
        }
        state.loading = false;
        Some(done)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/lifecycle.rs"]
mod tests;
