//! scrollmark - remembers the scroll position of every document and restores it
//! when the document is opened again.
//!
//! Modules:
//! - kernel: synchronization engine (state, change detection, restore, flush)
//! - kernel::services: ports (host, store, settings) and adapters (filesystem, watcher)
//! - app: headless host driving the engine from JSON-lines events

pub mod app;
pub mod kernel;
