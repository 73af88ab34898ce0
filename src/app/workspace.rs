//! In-memory stand-in for a document viewer, driven by [`HostEvent`]s.

use crate::app::event::HostEvent;
use crate::kernel::services::ports::{HostWorkspace, ViewIdentity};
use crate::kernel::Action;

#[derive(Debug, Clone, PartialEq)]
struct ViewSlot {
    id: String,
    document: Option<String>,
    scroll: Option<f64>,
}

#[derive(Debug, Default)]
pub struct HeadlessWorkspace {
    views: Vec<ViewSlot>,
    active: Option<String>,
    flashing: bool,
    next_view_id: u64,
}

impl HeadlessWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    pub fn active_view_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn document_in(&self, view: &str) -> Option<&str> {
        self.slot(view)?.document.as_deref()
    }

    /// Update the workspace for `event` and return the notification the host
    /// would raise, if any.
    pub fn apply(&mut self, event: &HostEvent) -> Option<Action> {
        match event {
            HostEvent::Ready => Some(Action::LayoutReady),
            HostEvent::Open { path, view } => {
                let id = match view {
                    Some(id) => id.clone(),
                    None => match self.active.clone() {
                        Some(id) => id,
                        None => self.fresh_view_id(),
                    },
                };
                match self.slot_mut(&id) {
                    Some(slot) => {
                        slot.document = Some(path.clone());
                        slot.scroll = Some(0.0);
                    }
                    None => self.views.push(ViewSlot {
                        id: id.clone(),
                        document: Some(path.clone()),
                        scroll: Some(0.0),
                    }),
                }
                self.active = Some(id);
                Some(Action::FileOpen)
            }
            HostEvent::Focus { view } => {
                if self.slot(view).is_none() || self.active.as_deref() == Some(view.as_str()) {
                    return None;
                }
                self.active = Some(view.clone());
                Some(Action::FileOpen)
            }
            HostEvent::Close { view } => {
                let before = self.views.len();
                self.views.retain(|slot| &slot.id != view);
                if self.views.len() == before || self.active.as_deref() != Some(view.as_str()) {
                    return None;
                }
                self.active = self.views.last().map(|slot| slot.id.clone());
                Some(Action::FileOpen)
            }
            HostEvent::Scroll { to } => {
                self.scroll_active(*to)?;
                Some(Action::Scroll)
            }
            HostEvent::Wheel { to } => {
                self.scroll_active(*to)?;
                Some(Action::Wheel)
            }
            HostEvent::Key { key, to } => {
                if let Some(to) = to {
                    self.scroll_active(*to)?;
                }
                Some(Action::Key(key.clone()))
            }
            HostEvent::Flash { on } => {
                self.flashing = *on;
                None
            }
            HostEvent::Rename { from, to } => {
                self.rename(from, to);
                Some(Action::Rename {
                    from: from.clone(),
                    to: to.clone(),
                })
            }
            HostEvent::Delete { path } => {
                self.delete(path);
                Some(Action::Delete { path: path.clone() })
            }
            HostEvent::Quit => Some(Action::Quit),
        }
    }

    pub fn rename(&mut self, from: &str, to: &str) {
        for slot in &mut self.views {
            if slot.document.as_deref() == Some(from) {
                slot.document = Some(to.to_string());
            }
        }
    }

    pub fn delete(&mut self, path: &str) {
        for slot in &mut self.views {
            if slot.document.as_deref() == Some(path) {
                slot.document = None;
                slot.scroll = None;
            }
        }
    }

    fn scroll_active(&mut self, to: f64) -> Option<()> {
        let slot = self.active_slot_mut()?;
        slot.document.as_ref()?;
        slot.scroll = Some(to);
        Some(())
    }

    fn fresh_view_id(&mut self) -> String {
        self.next_view_id += 1;
        format!("view-{}", self.next_view_id)
    }

    fn slot(&self, id: &str) -> Option<&ViewSlot> {
        self.views.iter().find(|slot| slot.id == id)
    }

    fn slot_mut(&mut self, id: &str) -> Option<&mut ViewSlot> {
        self.views.iter_mut().find(|slot| slot.id == id)
    }

    fn active_slot(&self) -> Option<&ViewSlot> {
        self.slot(self.active.as_deref()?)
    }

    fn active_slot_mut(&mut self) -> Option<&mut ViewSlot> {
        let id = self.active.clone()?;
        self.slot_mut(&id)
    }
}

impl HostWorkspace for HeadlessWorkspace {
    fn active_path(&self) -> Option<&str> {
        self.active_slot()?.document.as_deref()
    }

    fn most_recent_view(&self) -> Option<ViewIdentity> {
        let slot = self.active_slot()?;
        Some(ViewIdentity::new(slot.id.clone(), slot.document.as_deref()))
    }

    fn open_views(&self) -> Vec<ViewIdentity> {
        self.views
            .iter()
            .filter(|slot| slot.document.is_some())
            .map(|slot| ViewIdentity::new(slot.id.clone(), slot.document.as_deref()))
            .collect()
    }

    fn view_scroll(&self) -> Option<f64> {
        let slot = self.active_slot()?;
        slot.document.as_ref()?;
        slot.scroll
    }

    fn has_flashing_marker(&self) -> bool {
        self.flashing
    }

    fn set_view_scroll(&mut self, path: &str, scroll: f64) -> bool {
        let Some(slot) = self.active_slot_mut() else {
            return false;
        };
        if slot.document.as_deref() != Some(path) {
            return false;
        }
        slot.scroll = Some(scroll);
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/app/workspace.rs"]
mod tests;
