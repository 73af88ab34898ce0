//! JSON-lines protocol of the headless host.

use serde::{Deserialize, Serialize};

/// One line of host input, e.g. `{"type":"open","path":"notes/a.md"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    Ready,
    Open {
        path: String,
        #[serde(default)]
        view: Option<String>,
    },
    Focus {
        view: String,
    },
    Close {
        view: String,
    },
    Scroll {
        to: f64,
    },
    Wheel {
        to: f64,
    },
    Key {
        key: String,
        #[serde(default)]
        to: Option<f64>,
    },
    Flash {
        on: bool,
    },
    Rename {
        from: String,
        to: String,
    },
    Delete {
        path: String,
    },
    Quit,
}

/// Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_line(line: &str) -> serde_json::Result<Option<HostEvent>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

/// One line of output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Report {
    Restored { path: String, scroll: f64 },
    Invalid { line: usize, error: String },
    Stopped { entries: usize },
}

#[cfg(test)]
#[path = "../../tests/unit/app/event.rs"]
mod tests;
