use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::kernel::services::ports::ViewIdentity;

const SCROLL_SCALE: f64 = 10_000.0;

/// Round a scroll offset to 4 decimal places. Offsets too large to scale are
/// returned as is.
pub fn round_scroll(value: f64) -> f64 {
    let scaled = value * SCROLL_SCALE;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / SCROLL_SCALE
}

/// Transient per-document view state. Only the scroll offset is tracked.
///
/// Two states are equal iff both carry the same `scroll` or both carry none.
/// `Some(0.0)` is a real position, distinct from `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EphemeralState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll: Option<f64>,
}

impl EphemeralState {
    pub fn with_scroll(scroll: f64) -> Self {
        Self {
            scroll: Some(round_scroll(scroll.max(0.0))),
        }
    }

    /// Build a state from a raw host sample. Missing or non-finite samples
    /// produce a state without a position.
    pub fn sampled(raw: Option<f64>) -> Self {
        match raw {
            Some(v) if v.is_finite() => Self::with_scroll(v),
            _ => Self::default(),
        }
    }

    pub fn has_position(&self) -> bool {
        self.scroll.is_some()
    }
}

/// Document path -> last known state. Keys are kept sorted so the serialized
/// form is stable and can be compared byte for byte.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateCache {
    entries: BTreeMap<String, EphemeralState>,
}

impl StateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&EphemeralState> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn insert(&mut self, path: impl Into<String>, state: EphemeralState) {
        self.entries.insert(path.into(), state);
    }

    pub fn remove(&mut self, path: &str) -> Option<EphemeralState> {
        self.entries.remove(path)
    }

    /// Move the entry at `from` to `to`. When `from` has no entry, `to` ends up
    /// without one as well.
    pub fn rename(&mut self, from: &str, to: &str) {
        match self.entries.remove(from) {
            Some(state) => {
                self.entries.insert(to.to_string(), state);
            }
            None => {
                self.entries.remove(to);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EphemeralState)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

/// Tracking state for the document currently considered open.
#[derive(Debug, Clone, Default)]
pub struct LifecycleState {
    pub last_loaded_path: Option<String>,
    /// Last observed or restored state for `last_loaded_path`. `None` means no
    /// baseline has been taken yet.
    pub baseline: Option<EphemeralState>,
    /// A restore for `last_loaded_path` is in flight.
    pub loading: bool,
    /// Views seen on the last open pass.
    pub open_views: FxHashSet<ViewIdentity>,
}

impl LifecycleState {
    pub fn is_tracking(&self, path: &str) -> bool {
        !self.loading && self.last_loaded_path.as_deref() == Some(path)
    }

    /// Forget the tracked document.
    pub fn clear_document(&mut self) {
        self.last_loaded_path = None;
        self.baseline = None;
        self.loading = false;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/state.rs"]
mod tests;
