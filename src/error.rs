use std::path::PathBuf;

use thiserror::Error;

/// Result type for operations that may fail on malformed input
pub type Result<T> = std::result::Result<T, Error>;

/// Malformed external input: files, containers, parallel lists
#[derive(Error, Debug)]
pub enum FormatError {
    /// A required file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value in a file or container is not a number
    #[error("{origin}: cannot parse {value:?} as a number")]
    NotANumber { origin: String, value: String },

    /// Container is not valid JSON
    #[error("{origin}: invalid JSON: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// Two sequences that must line up do not
    #[error("{origin}: length mismatch, {what}: {found} != {expected}")]
    LengthMismatch {
        origin: String,
        what: String,
        found: usize,
        expected: usize,
    },

    /// A field that must hold an integer does not
    #[error("{origin}: {what} must be a non-negative integer, got {value}")]
    NotInteger {
        origin: String,
        what: String,
        value: f64,
    },

    /// A required field is absent under every known alias
    #[error("{origin}: missing {what} (unrecognized structure)")]
    Missing { origin: String, what: String },

    /// Anything else about the shape of the input
    #[error("{origin}: {details}")]
    Malformed { origin: String, details: String },
}

/// Invariant violation in a problem, detected before any backend is built
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid problem: {details}")]
pub struct ValidationError {
    pub details: String,
}

impl ValidationError {
    pub fn new(details: impl Into<String>) -> Self {
        ValidationError {
            details: details.into(),
        }
    }
}

/// Input rejected by the knapsack solver
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KnapsackError {
    #[error("values and weights must have the same length ({values} != {weights})")]
    LengthMismatch { values: usize, weights: usize },

    #[error("capacity must be a non-negative integer, got {0}")]
    InvalidCapacity(f64),

    #[error("weight {index} must be a non-negative integer, got {value}")]
    InvalidWeight { index: usize, value: f64 },

    #[error("table of {items} items by capacity {capacity} does not fit in memory")]
    TableTooLarge { items: usize, capacity: u64 },
}

/// No backend able to take the routed problem can be built right now
#[derive(Error, Debug, Clone, PartialEq)]
#[error("no {class} backend available: {reason}")]
pub struct BackendUnavailable {
    pub class: String,
    pub reason: String,
}

/// A backend failed while building or solving its model
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{solver}: {details}")]
pub struct BackendError {
    pub solver: String,
    pub details: String,
}

/// Errors that propagate to the caller
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Knapsack(#[from] KnapsackError),
}
