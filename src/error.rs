//! Error types for the Enigma library.

use thiserror::Error;

/// Errors produced by the Enigma library.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnigmaError {
    /// Caller misuse of a construction or setup contract: wrong slot count,
    /// illegal rotor placement, wrong setting length, unknown rotor name,
    /// malformed configuration or settings text.
    #[error("Configuration error: {0}")]
    Config(String),
    /// Symbol is not present in the bound alphabet.
    #[error("Symbol '{0}' is not in the alphabet")]
    SymbolNotFound(char),
    /// Index is outside `0..size`.
    #[error("Index {index} is outside the alphabet range 0..{size}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Size of the alphabet it was checked against.
        size: usize,
    },
}

impl EnigmaError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type alias for Enigma operations.
pub type Result<T> = std::result::Result<T, EnigmaError>;
