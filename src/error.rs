//! Error types for graph tracing and execution.
//!
//! This module defines [`GraphError`], the error type used throughout the
//! crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Contract errors are raised while a pipeline is traced and are never recovered
//! - Name resolution errors mean a value was referenced without having been produced
//! - Backend errors are propagated unwrapped and abort the whole run
//! - Use `anyhow::Error` (via `GraphError::Other`) inside component bodies

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tracing and running pipelines.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A graph-construction rule was violated while tracing.
    #[error("Trace contract violated: {message}")]
    TraceContract { message: String },

    /// A node reference was absent from the local value table.
    #[error("Name '{name}' was referenced but never produced in this scope")]
    NameResolution { name: String },

    /// No registered operator overload accepts the operand types.
    #[error(
        "No overload of '{operator}' matches signature {attempted}. Registered signatures: [{available}]"
    )]
    DispatchResolution {
        operator: String,
        attempted: String,
        available: String,
    },

    /// A backend primitive failed while running a component.
    #[error("Component '{component}' failed: {message}")]
    BackendExecution { component: String, message: String },

    /// A component produced a value that does not match its declared type.
    #[error("Component '{component}' declared {expected} but produced {found}")]
    OutputContract {
        component: String,
        expected: String,
        found: String,
    },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GraphError {
    /// Shorthand for a [`GraphError::TraceContract`] error.
    pub fn contract(message: impl Into<String>) -> Self {
        GraphError::TraceContract {
            message: message.into(),
        }
    }

    /// Shorthand for a [`GraphError::BackendExecution`] error.
    pub fn backend(component: impl Into<String>, message: impl Into<String>) -> Self {
        GraphError::BackendExecution {
            component: component.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
