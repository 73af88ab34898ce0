//! Change detection: turns bursts of scroll/wheel/key notifications into
//! occasional evaluations of the view position.

use std::time::{Duration, Instant};

use crate::kernel::services::ports::HostWorkspace;
use crate::kernel::state::{EphemeralState, LifecycleState, StateCache};

pub const SCROLL_DEBOUNCE: Duration = Duration::from_millis(50);
pub const KEY_SETTLE: Duration = Duration::from_millis(10);

/// Keys that move the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    PageUp,
    PageDown,
    Home,
    End,
    Space,
}

impl NavKey {
    pub fn from_key_name(name: &str) -> Option<Self> {
        if name == " " {
            return Some(NavKey::Space);
        }
        let key = match name.trim().to_ascii_lowercase().as_str() {
            "arrowup" | "up" => NavKey::ArrowUp,
            "arrowdown" | "down" => NavKey::ArrowDown,
            "arrowleft" | "left" => NavKey::ArrowLeft,
            "arrowright" | "right" => NavKey::ArrowRight,
            "pageup" => NavKey::PageUp,
            "pagedown" => NavKey::PageDown,
            "home" => NavKey::Home,
            "end" => NavKey::End,
            "space" | "spacebar" => NavKey::Space,
            _ => return None,
        };
        Some(key)
    }
}

/// Single trailing-edge deadline. Scheduling again replaces the pending one.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Fires at most once per schedule.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Evaluation {
    /// No tracked document, or a restore is in flight.
    Skipped,
    /// First sample for the document became the baseline.
    Adopted,
    Unchanged,
    Changed(EphemeralState),
}

#[derive(Debug, Clone)]
pub struct ChangeDetector {
    scroll: Debouncer,
    key_deadlines: Vec<Instant>,
}

impl Default for ChangeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self {
            scroll: Debouncer::new(SCROLL_DEBOUNCE),
            key_deadlines: Vec::new(),
        }
    }

    /// Scroll and wheel notifications share one debounce chain.
    pub fn on_scroll(&mut self, now: Instant) {
        self.scroll.schedule(now);
    }

    /// Returns false for keys that don't move the viewport.
    pub fn on_key(&mut self, key: &str, now: Instant) -> bool {
        if NavKey::from_key_name(key).is_none() {
            return false;
        }
        self.key_deadlines.push(now + KEY_SETTLE);
        true
    }

    /// Whether an evaluation is due. Everything due at `now` collapses into one.
    pub fn poll(&mut self, now: Instant) -> bool {
        let mut due = self.scroll.poll(now);
        let before = self.key_deadlines.len();
        self.key_deadlines.retain(|deadline| *deadline > now);
        due |= self.key_deadlines.len() != before;
        due
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.key_deadlines
            .iter()
            .copied()
            .chain(self.scroll.deadline())
            .min()
    }

    pub fn is_idle(&self) -> bool {
        !self.scroll.is_pending() && self.key_deadlines.is_empty()
    }

    pub fn cancel_all(&mut self) {
        self.scroll.cancel();
        self.key_deadlines.clear();
    }
}

/// Sample the focused view and record the position if it moved.
pub fn check_changed(
    lifecycle: &mut LifecycleState,
    cache: &mut StateCache,
    host: &dyn HostWorkspace,
) -> Evaluation {
    let Some(active) = host.active_path() else {
        return Evaluation::Skipped;
    };
    if !lifecycle.is_tracking(active) {
        return Evaluation::Skipped;
    }

    let sample = EphemeralState::sampled(host.view_scroll());
    let Some(baseline) = lifecycle.baseline else {
        lifecycle.baseline = Some(sample);
        return Evaluation::Adopted;
    };

    if !sample.has_position() || sample == baseline {
        return Evaluation::Unchanged;
    }

    cache.insert(active, sample);
    lifecycle.baseline = Some(sample);
    Evaluation::Changed(sample)
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/detector.rs"]
mod tests;
