//! Error handling module for TrimX Studio

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Error type for configuration, argument parsing and rendering
#[derive(Error, Debug)]
pub enum StudioError {
    /// Configuration could not be resolved
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input file not found or inaccessible
    #[error("Input file not found: {path}")]
    InputFileNotFound { path: String },

    /// Bad `START-END` segment argument
    #[error("Invalid segment '{spec}'. Expected START-END, e.g. 10-20 or 0:10-0:20")]
    InvalidSegmentSpec { spec: String },

    /// Bad token in a key script
    #[error("Invalid key token '{token}': {reason}")]
    InvalidKeyToken { token: String, reason: String },

    /// Output rendering error
    #[error("Failed to render output: {message}")]
    Render { message: String },

    /// Domain error
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Result type alias for studio operations
pub type StudioResult<T> = std::result::Result<T, StudioError>;
