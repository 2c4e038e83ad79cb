//! Error types for the analysis core.

use thiserror::Error;

/// Errors that can occur while analysing a ciphertext or editing a substitution.
///
/// Every operation that returns one of these leaves its receiver unchanged.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// An empty string was given where a single user character was expected.
    #[error("Empty character")]
    EmptyCharacter,

    /// The string segments into zero or several user characters.
    #[error("'{0}' is not a single user character")]
    NotUserCharacter(String),

    /// Per-alphabet data does not match the number of alphabets.
    #[error("Expected data for {expected} alphabets, got {got}")]
    AlphabetCountMismatch {
        /// Number of alphabets in use.
        expected: usize,
        /// Number of entries supplied.
        got: usize,
    },

    /// An alphabet index is outside the valid range.
    #[error("Index {index} is out of range (len: {len})")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of valid positions.
        len: usize,
    },

    /// A substitution needs at least one alphabet.
    #[error("Invalid number of alphabets: {0}")]
    InvalidAlphabetCount(usize),

    /// Reference coincidence index outside the open interval (0, 1).
    #[error("Reference coincidence index {0} is out of range (0, 1)")]
    InvalidReferenceIndex(f64),

    /// Reference alphabet size must be positive.
    #[error("Invalid reference alphabet size: {0}")]
    InvalidAlphabetSize(usize),

    /// Block size for ciphertext regrouping must be positive.
    #[error("Invalid block size: {0}")]
    InvalidBlockSize(usize),

    /// Injective mode forbids reusing a plain character.
    #[error("Plain character '{0}' is already in use")]
    PlainCharacterInUse(String),

    /// The character is not an active cipher character.
    #[error("'{0}' is not in the cipher alphabet")]
    NotInCipherAlphabet(String),

    /// The character is not among the ignored characters.
    #[error("'{0}' is not an ignored character")]
    NotIgnored(String),

    /// The character is not in the plain alphabet.
    #[error("'{0}' is not in the plain alphabet")]
    NotInPlainAlphabet(String),

    /// Coincidence-based statistics need at least two accepted characters.
    #[error("Too few characters for statistics (found {found}, need at least 2)")]
    TooFewCharacters {
        /// Number of accepted characters found.
        found: usize,
    },

    /// A long-running scan was stopped by its caller.
    #[error("Operation cancelled")]
    Cancelled,

    /// I/O error while loading a config, profile or key file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Profile or key (de)serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AnalysisError>;
