//! Error types for the tracker
//!
//! This module defines all error types used throughout the crate.
//!
//! Transient resolution failures are not errors at this level: they are
//! absorbed by the retry state machine (see [`crate::query`]). Everything
//! that reaches the caller as an [`Error`] stops the poll loop.

use thiserror::Error;

/// Result type alias for tracker operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the tracker
#[derive(Error, Debug)]
pub enum Error {
    /// The durable working set could not be read or is malformed
    #[error("State store read error: {0}")]
    StorageRead(String),

    /// The durable working set could not be written
    #[error("State store write error: {0}")]
    StorageWrite(String),

    /// The track history could not be appended to
    #[error("Track history error: {0}")]
    Track(String),

    /// Selection was requested on an empty working set
    #[error("Working set is empty")]
    EmptyWorkingSet,

    /// A resolver failure outside the transient taxonomy
    #[error("Unclassified resolver failure for {domain}: {message}")]
    Resolver {
        /// Domain being resolved
        domain: String,
        /// Failure description from the resolver
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a state store read error
    pub fn storage_read(msg: impl Into<String>) -> Self {
        Self::StorageRead(msg.into())
    }

    /// Create a state store write error
    pub fn storage_write(msg: impl Into<String>) -> Self {
        Self::StorageWrite(msg.into())
    }

    /// Create a track history error
    pub fn track(msg: impl Into<String>) -> Self {
        Self::Track(msg.into())
    }

    /// Create an unclassified resolver error
    pub fn resolver(domain: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resolver {
            domain: domain.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Name of the operation that failed, for user-facing reports
    pub fn operation(&self) -> &'static str {
        match self {
            Error::StorageRead(_) => "state load",
            Error::StorageWrite(_) => "state persist",
            Error::Track(_) => "track append",
            Error::EmptyWorkingSet => "domain selection",
            Error::Resolver { .. } => "dns resolve",
            Error::Config(_) | Error::InvalidInput(_) => "configuration",
            Error::Other(_) => "runtime",
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
