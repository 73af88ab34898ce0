use crate::kernel::services::ports::HostWorkspace;

/// View mutations the host performs on behalf of the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SetScroll { path: String, scroll: f64 },
}

impl Effect {
    /// Returns whether the host accepted the effect.
    pub fn apply<H: HostWorkspace + ?Sized>(&self, host: &mut H) -> bool {
        match self {
            Effect::SetScroll { path, scroll } => host.set_view_scroll(path, *scroll),
        }
    }
}
