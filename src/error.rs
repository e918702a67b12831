//! Crate-wide error types.
//!
//! This module provides a unified error hierarchy for the engine.
//! Subsystems use specific error types via `thiserror`; the top-level
//! [`Error`] aggregates them for callers that don't care which layer failed.
//!
//! # Design
//!
//! - [`Error`]: Top-level error enum
//! - Subsystem errors (e.g., [`crate::geocode::GeocodeError`]) for detailed handling
//! - All errors implement `std::error::Error` for compatibility

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level engine error.
///
/// Aggregates errors from all subsystems for unified handling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Geocoding provider error
    #[error("Geocoding error: {0}")]
    Geocode(#[from] crate::geocode::GeocodeError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller misuse (empty address, malformed catalog, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid-input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}
