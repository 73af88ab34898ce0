//! Services layer (ports + adapters).
//!
//! - `ports`: contracts the kernel consumes (host workspace, durable store, settings).
//! - `adapters`: OS specific implementations (filesystem, watcher, paths).

pub mod adapters;
pub mod ports;
