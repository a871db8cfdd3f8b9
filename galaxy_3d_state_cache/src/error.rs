//! Error types for the Galaxy3D state cache
//!
//! Factory failures are the only recoverable errors: a cache that fails to create a
//! native object reports it here and keeps its previous contents.

use std::fmt;

/// Result type for state cache operations
pub type Result<T> = std::result::Result<T, Error>;

/// State cache errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Backend-specific error (native object creation failed)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (unknown handle, stale serial, bad descriptor)
    InvalidResource(String),

    /// Feature not supported by the device or backend
    Unsupported(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::Unsupported(msg) => write!(f, "Unsupported: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
