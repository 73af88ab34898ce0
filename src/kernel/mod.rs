//! Headless synchronization core (state/action/effect).

pub mod action;
pub mod detector;
pub mod effect;
pub mod engine;
pub mod flush;
pub mod lifecycle;
pub mod services;
pub mod state;

pub use action::Action;
pub use detector::{ChangeDetector, Debouncer, Evaluation, NavKey};
pub use effect::Effect;
pub use engine::{DispatchResult, Engine};
pub use flush::{FlushOutcome, FlushScheduler};
pub use lifecycle::{LifecycleCoordinator, OpenOutcome, PendingRestore, RestorePhase, RestoreStep};
pub use state::{EphemeralState, LifecycleState, StateCache};
