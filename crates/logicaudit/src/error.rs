//! Error types for logicaudit.
//!
//! Only the outer surfaces (configuration, the embedded deck, user input and
//! output) can fail. Navigation itself has no recoverable errors: an
//! out-of-range scenario index is a bug and panics instead.

use thiserror::Error;

/// The main error type for logicaudit operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Scenario Errors ===
    /// A deck was built from zero scenarios.
    #[error("scenario deck is empty")]
    EmptyDataset,

    /// No scenario carries the requested identifier.
    #[error("no scenario with id {id}")]
    ScenarioNotFound {
        /// The identifier that was looked up.
        id: u32,
    },

    // === Input Errors ===
    /// A line of user input did not name a known command.
    #[error("unknown command '{input}' (expected audit, next or quit)")]
    UnknownCommand {
        /// The trimmed input line.
        input: String,
    },

    // === I/O Errors ===
    /// Terminal or file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for logicaudit operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an unknown command error.
    #[must_use]
    pub fn unknown_command(input: impl Into<String>) -> Self {
        Self::UnknownCommand {
            input: input.into(),
        }
    }

    /// Check if this error came from unrecognised user input.
    #[must_use]
    pub fn is_unknown_command(&self) -> bool {
        matches!(self, Self::UnknownCommand { .. })
    }
}
