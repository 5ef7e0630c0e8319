//! Error handling for the live inspector
//!
//! This module defines the crate error type and a Result alias. Every
//! failure the sync engine can hit is recovered locally: callers log it
//! through the console and leave cached state untouched.

use thiserror::Error;

/// Main error type for live inspector operations
#[derive(Error, Debug)]
pub enum InspectorError {
    /// The request never produced a usable response (connect, timeout, bad status)
    #[error("Network error: {0}")]
    Network(String),

    /// The engine answered but refused the operation
    #[error("Engine rejected request: {0}")]
    RemoteRejected(String),

    /// An id was not present in the cached snapshot or component list
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u64 },

    /// A write was attempted while the simulation is running
    #[error("Cannot edit while engine is running")]
    GateClosed,

    /// A field path or value could not be interpreted
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to channel communication
    #[error("Channel error: {0}")]
    Channel(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<InspectorError>,
    },
}

impl InspectorError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        InspectorError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for a missing entity
    pub fn entity_not_found(id: u64) -> Self {
        InspectorError::NotFound { kind: "Entity", id }
    }

    /// Shorthand for a missing component
    pub fn component_not_found(id: u64) -> Self {
        InspectorError::NotFound {
            kind: "Component",
            id,
        }
    }

    /// Strip context wrappers and return the underlying error
    pub fn root(&self) -> &InspectorError {
        match self {
            InspectorError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether this error means the write never left the client
    pub fn is_gate_closed(&self) -> bool {
        matches!(self.root(), InspectorError::GateClosed)
    }
}

impl From<reqwest::Error> for InspectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            InspectorError::Serialization(err.to_string())
        } else {
            InspectorError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for InspectorError {
    fn from(err: serde_json::Error) -> Self {
        InspectorError::Serialization(err.to_string())
    }
}

/// Result type alias for live inspector operations
pub type Result<T> = std::result::Result<T, InspectorError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
