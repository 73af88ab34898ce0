//! Durable store contract.
//!
//! The engine persists one JSON document through this trait. Implementations are
//! thin pass-throughs to whatever storage the host exposes.

use std::io;
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    NotFound(PathBuf),
    Malformed(serde_json::Error),
    InvalidPath(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "IO error: {}", e),
            StoreError::NotFound(p) => write!(f, "Not found: {}", p.display()),
            StoreError::Malformed(e) => write!(f, "Malformed store file: {}", e),
            StoreError::InvalidPath(s) => write!(f, "Invalid path: {}", s),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Malformed(e) => Some(e),
            StoreError::NotFound(_) | StoreError::InvalidPath(_) => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Malformed(e)
    }
}

/// Storage the state file lives in. Paths are relative to the store's root.
pub trait StateStore: Send {
    fn exists(&self, path: &Path) -> bool;

    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()>;

    fn mkdir(&self, path: &Path) -> Result<()>;
}
