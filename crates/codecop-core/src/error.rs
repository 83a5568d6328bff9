//! Error types and error code constants for codecop.
//!
//! This module provides a unified error type (`CodecopError`) that bridges
//! domain-specific errors from different subsystems (parsing, config, rename,
//! apply) into a common format suitable for a host's error reporting.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad input from caller)
//! - `3`: Resolution errors (symbol not found, stale index)
//! - `4`: Apply errors (edit conflicts)
//! - `6`: Cancelled by the host
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! Domain errors bridge in via `impl From<X> for CodecopError`, either here
//! (for core types) or in the crate that owns `X`.

use std::fmt;

use thiserror::Error;

use crate::cancel::Cancelled;
use crate::patch::Conflict;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Stable error codes for host-facing error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed config).
    InvalidArguments = 2,
    /// Resolution errors (symbol not found, stale index).
    ResolutionError = 3,
    /// Apply errors (conflicting or stale edits).
    ApplyError = 4,
    /// The host cancelled the operation.
    Cancelled = 6,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for everything a host can observe.
#[derive(Debug, Error)]
pub enum CodecopError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Invalid identifier (a new name that cannot be written in source).
    #[error("invalid identifier '{name}': {reason}")]
    InvalidIdentifier { name: String, reason: String },

    /// Source text could not be parsed.
    #[error("parse error in {file} at {line}:{col}: {message}")]
    ParseError {
        file: String,
        line: u32,
        col: u32,
        message: String,
    },

    /// Configuration could not be loaded.
    #[error("configuration error: {message}")]
    ConfigError { message: String },

    /// Symbol not found in the index.
    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    /// The index was built from text that no longer matches.
    #[error("index is stale for {path}")]
    StaleIndex { path: String },

    /// Failed to apply edits.
    #[error("apply error: {message}")]
    ApplyError {
        message: String,
        file: Option<String>,
    },

    /// The host cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&CodecopError> for OutputErrorCode {
    fn from(err: &CodecopError) -> Self {
        match err {
            CodecopError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            CodecopError::InvalidIdentifier { .. } => OutputErrorCode::InvalidArguments,
            CodecopError::ParseError { .. } => OutputErrorCode::InvalidArguments,
            CodecopError::ConfigError { .. } => OutputErrorCode::InvalidArguments,
            CodecopError::SymbolNotFound { .. } => OutputErrorCode::ResolutionError,
            CodecopError::StaleIndex { .. } => OutputErrorCode::ResolutionError,
            CodecopError::ApplyError { .. } => OutputErrorCode::ApplyError,
            CodecopError::Cancelled => OutputErrorCode::Cancelled,
            CodecopError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<CodecopError> for OutputErrorCode {
    fn from(err: CodecopError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Bridges for core types
// ============================================================================

impl From<Cancelled> for CodecopError {
    fn from(_: Cancelled) -> Self {
        CodecopError::Cancelled
    }
}

impl From<Vec<Conflict>> for CodecopError {
    fn from(conflicts: Vec<Conflict>) -> Self {
        let message = match conflicts.as_slice() {
            [] => "edit set could not be applied".to_string(),
            [only] => only.to_string(),
            [first, rest @ ..] => format!("{} (and {} more)", first, rest.len()),
        };
        CodecopError::ApplyError {
            message,
            file: None,
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl CodecopError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        CodecopError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create a symbol not found error.
    pub fn symbol_not_found(symbol: impl fmt::Display) -> Self {
        CodecopError::SymbolNotFound {
            symbol: symbol.to_string(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        CodecopError::InternalError {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
