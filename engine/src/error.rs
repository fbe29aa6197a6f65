//! Typed errors for the engine library.
//!
//! Malformed corpus records are recovered during parsing and unknown-term
//! lookups return empty results, so neither reaches this type. The engine
//! never logs; every failure is returned to the caller.

use std::io;

use thiserror::Error;

/// Errors surfaced by engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A boolean query string that does not parse.
    #[error("invalid query: {0}")]
    Query(String),

    /// Unusable configuration, e.g. an unrecognized similarity model or an
    /// empty corpus handed to the weight builder.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Persistence I/O failure.
    #[error("storage error: {0}")]
    Io(#[from] io::Error),

    /// Persistence encode/decode failure.
    #[error("storage codec error: {0}")]
    Codec(#[from] bincode::Error),

    /// Metadata (de)serialization failure.
    #[error("metadata error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Create a new invalid-query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        EngineError::Query(msg.into())
    }

    /// Create a new invalid-configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        EngineError::Config(msg.into())
    }
}
