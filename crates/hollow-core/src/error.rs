//! Error types and error code constants for hollow.
//!
//! This module provides a unified error type (`HollowError`) that bridges
//! domain-specific errors from different subsystems (discovery, parsing,
//! rewriting, applying) into a common format suitable for JSON output.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad input from caller)
//! - `3`: Resolution errors (path not found)
//! - `4`: Apply errors (failed to write changes, content changed on disk)
//! - `5`: Verification failed (rewritten text disagrees with the span oracle)
//! - `6`: Parse errors (source file could not be parsed)
//! - `10`: Internal errors (bugs, unsupported declaration kinds)
//!
//! ## Design
//!
//! - **Unified type**: `HollowError` is the single error type for CLI output
//! - **Bridging**: `impl From<X> for HollowError` bridges domain errors
//! - **Code mapping**: `OutputErrorCode` provides stable integer codes for JSON

use std::fmt;

use thiserror::Error;

use crate::patch::SpanEditError;
use crate::workspace::DiscoveryError;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed request).
    InvalidArguments = 2,
    /// Resolution errors (path not found).
    ResolutionError = 3,
    /// Apply errors (failed to write changes, content mismatch).
    ApplyError = 4,
    /// Verification failed after rewriting.
    VerificationFailed = 5,
    /// Source could not be parsed.
    ParseError = 6,
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

/// Unified error type for CLI output.
///
/// Each variant carries enough context to produce a helpful message and the
/// optional `details` field of the JSON error response.
#[derive(Debug, Error)]
pub enum HollowError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// File or directory not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// Source file could not be parsed.
    #[error("parse error in {file}: {message}")]
    ParseError { file: String, message: String },

    /// Failed to apply changes.
    #[error("apply error: {message}")]
    ApplyError {
        message: String,
        file: Option<String>,
    },

    /// Rewritten output failed verification.
    #[error("verification failed for {file}: {message}")]
    VerificationFailed { file: String, message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&HollowError> for OutputErrorCode {
    fn from(err: &HollowError) -> Self {
        match err {
            HollowError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            HollowError::FileNotFound { .. } => OutputErrorCode::ResolutionError,
            HollowError::ParseError { .. } => OutputErrorCode::ParseError,
            HollowError::ApplyError { .. } => OutputErrorCode::ApplyError,
            HollowError::VerificationFailed { .. } => OutputErrorCode::VerificationFailed,
            HollowError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<HollowError> for OutputErrorCode {
    fn from(err: HollowError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Bridges
// ============================================================================

impl From<DiscoveryError> for HollowError {
    fn from(err: DiscoveryError) -> Self {
        match err {
            DiscoveryError::RootNotFound { path } => HollowError::FileNotFound {
                path: path.display().to_string(),
            },
            DiscoveryError::InvalidPattern { pattern, reason } => HollowError::InvalidArguments {
                message: format!("invalid exclude pattern '{}': {}", pattern, reason),
            },
            DiscoveryError::Walk { path, message } => HollowError::InternalError {
                message: format!("failed to walk {}: {}", path.display(), message),
            },
            DiscoveryError::Io { path, source } => HollowError::InternalError {
                message: format!("IO error at {}: {}", path.display(), source),
            },
        }
    }
}

impl From<SpanEditError> for HollowError {
    fn from(err: SpanEditError) -> Self {
        HollowError::InternalError {
            message: format!("span edit: {}", err),
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl HollowError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        HollowError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        HollowError::FileNotFound { path: path.into() }
    }

    /// Create a parse error for a file.
    pub fn parse(file: impl Into<String>, message: impl Into<String>) -> Self {
        HollowError::ParseError {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create an apply error attributed to a file.
    pub fn apply(file: impl Into<String>, message: impl Into<String>) -> Self {
        HollowError::ApplyError {
            message: message.into(),
            file: Some(file.into()),
        }
    }

    /// Create a verification failure for a file.
    pub fn verification(file: impl Into<String>, message: impl Into<String>) -> Self {
        HollowError::VerificationFailed {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        HollowError::InternalError {
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
