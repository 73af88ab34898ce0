//! Service ports: traits + data contracts.

pub mod host;
pub mod settings;
pub mod store;

pub use host::{HostWorkspace, ViewIdentity};
pub use settings::Settings;
pub use store::{Result as StoreResult, StateStore, StoreError};
