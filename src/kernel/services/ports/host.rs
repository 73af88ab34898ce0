//! Host workspace contract: the queries the engine makes against the viewer.

/// A materialized (view, document) pair. Two notifications for the same pair
/// refer to the same already-handled view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewIdentity {
    pub view_id: String,
    pub document: Option<String>,
}

impl ViewIdentity {
    pub fn new(view_id: impl Into<String>, document: Option<&str>) -> Self {
        Self {
            view_id: view_id.into(),
            document: document.map(str::to_owned),
        }
    }
}

pub trait HostWorkspace {
    /// Logical path of the document in the focused view.
    fn active_path(&self) -> Option<&str>;

    fn most_recent_view(&self) -> Option<ViewIdentity>;

    /// Every document view currently open, across all panes.
    fn open_views(&self) -> Vec<ViewIdentity>;

    /// Current scroll offset of the focused view. `None` when no document view is
    /// focused; may be NaN while nothing is rendered yet.
    fn view_scroll(&self) -> Option<f64>;

    /// Whether the focused view shows a transient link-target highlight, meaning
    /// the host is about to scroll on its own.
    fn has_flashing_marker(&self) -> bool;

    /// Scroll the focused view, but only while it still shows `path`.
    fn set_view_scroll(&mut self, path: &str, scroll: f64) -> bool;
}
