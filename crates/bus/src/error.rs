//! Event bus errors

use thiserror::Error;

/// Errors that can occur at the bus boundary
#[derive(Debug, Error)]
pub enum BusError {
    #[error("Handler error: {0}")]
    Handler(String),
}

impl BusError {
    /// Wrap an arbitrary handler error for the bus boundary
    pub fn handler(err: impl std::fmt::Display) -> Self {
        Self::Handler(err.to_string())
    }
}
