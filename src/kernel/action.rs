/// Host notifications the engine reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A document became active in some view.
    FileOpen,
    /// The host finished its initial layout; treated like an open of whatever is
    /// already showing.
    LayoutReady,
    Rename {
        from: String,
        to: String,
    },
    Delete {
        path: String,
    },
    Quit,
    Scroll,
    Wheel,
    /// Key released in the viewer, by key name (`"PageDown"`, `"ArrowUp"`, `" "`).
    Key(String),
}
