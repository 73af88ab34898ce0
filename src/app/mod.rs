//! Headless host: feeds the engine from a JSON-lines event stream.

pub mod driver;
pub mod event;
pub mod signals;
pub mod workspace;

pub use driver::{run, DriverEvent, DriverOptions};
pub use event::{parse_line, HostEvent, Report};
pub use signals::TerminationSignal;
pub use workspace::HeadlessWorkspace;
