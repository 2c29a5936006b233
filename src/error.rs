//! Application error types

use thiserror::Error;

use crate::rates::RateError;

/// Failures that end the run loop. Validation problems never get here; they
/// are shown in the form's error slots.
#[derive(Error, Debug)]
pub enum AppError {
    /// Terminal backend failure (raw mode, writes, flush)
    #[error("terminal error: {0}")]
    Terminal(String),

    /// Rate tables could not be loaded or a lookup missed
    #[error("rate calculation failed: {0}")]
    Rate(#[from] RateError),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for application operations
pub type Result<T> = std::result::Result<T, AppError>;
