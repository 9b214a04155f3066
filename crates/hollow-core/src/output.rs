//! JSON output types and serialization for CLI responses.
//!
//! These types are the **agent contract** of the `hollow` binary: everything a
//! caller can learn from a run is in the serialized response.
//!
//! ## Design Principles
//!
//! 1. **Status first:** Every response has `status` as first field
//! 2. **Deterministic:** Files and declarations are listed in discovery and
//!    source order
//! 3. **Nullable vs absent:** Optional fields are omitted when not applicable
//! 4. **Versioned:** Schema version in response enables forward compatibility

use std::io::{self, Write};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HollowError, OutputErrorCode};
use crate::stats::{FailedFile, RunStats};

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Location
// ============================================================================

/// A position in a source file.
///
/// `line` and `col` are 1-indexed; byte offsets are 0-indexed and optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub col: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_start: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_end: Option<u64>,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32, col: u32) -> Self {
        Location {
            file: file.into(),
            line,
            col,
            byte_start: None,
            byte_end: None,
        }
    }

    /// Attach the byte range of the located item.
    pub fn with_span(mut self, start: u64, end: u64) -> Self {
        self.byte_start = Some(start);
        self.byte_end = Some(end);
        self
    }
}

// ============================================================================
// Per-file report
// ============================================================================

/// Kind of a rewritten declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Method,
    Operator,
}

impl std::fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeclarationKind::Method => write!(f, "method"),
            DeclarationKind::Operator => write!(f, "operator"),
        }
    }
}

/// One declaration that was (or, in analyze mode, would be) rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedDeclaration {
    pub kind: DeclarationKind,
    /// Method name, or operator token (`+`, `==`, `true`, ...).
    pub name: String,
    /// Nearest enclosing class.
    pub class: String,
    pub location: Location,
}

/// What happened to one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub path: String,
    /// "modified" after a write, "eligible" in analyze mode.
    pub status: String,
    pub declarations: Vec<ChangedDeclaration>,
    /// Classes with at least one rewritten declaration, in source order.
    pub classes: Vec<String>,
    /// Unified diff of the change, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

impl FileReport {
    pub fn new(
        path: impl Into<String>,
        status: impl Into<String>,
        declarations: Vec<ChangedDeclaration>,
        classes: Vec<String>,
    ) -> Self {
        FileReport {
            path: path.into(),
            status: status.into(),
            declarations,
            classes,
            diff: None,
        }
    }

    pub fn with_diff(mut self, diff: String) -> Self {
        self.diff = Some(diff);
        self
    }

    pub fn count(&self, kind: DeclarationKind) -> usize {
        self.declarations.iter().filter(|d| d.kind == kind).count()
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Run counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub roots_total: u32,
    pub roots_processed: u32,
    pub files_processed: u32,
    pub files_modified: u32,
    pub classes_modified: u32,
    pub methods_modified: u32,
    pub operators_modified: u32,
    pub files_failed: u32,
}

impl Summary {
    pub fn from_stats(stats: &RunStats) -> Self {
        Summary {
            roots_total: stats.roots_total,
            roots_processed: stats.roots_processed,
            files_processed: stats.files_processed,
            files_modified: stats.files_modified,
            classes_modified: stats.classes_modified,
            methods_modified: stats.methods_modified,
            operators_modified: stats.operators_modified,
            files_failed: stats.failed.len() as u32,
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Response for `analyze` and `run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    /// "analyze" or "run".
    pub mode: String,
    /// Whether rewritten files were verified.
    pub verified: bool,
    pub summary: Summary,
    /// Files with at least one eligible declaration.
    pub files: Vec<FileReport>,
    pub failed: Vec<FailedFile>,
    /// RFC 3339 completion time.
    pub finished_at: String,
}

impl RunResponse {
    pub fn new(mode: &str, verified: bool, stats: &RunStats, files: Vec<FileReport>) -> Self {
        RunResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            mode: mode.to_string(),
            verified,
            summary: Summary::from_stats(stats),
            files,
            failed: stats.failed.clone(),
            finished_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Error information for error responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code (see [`OutputErrorCode`]).
    pub code: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    pub fn from_error(err: &HollowError) -> Self {
        let code = OutputErrorCode::from(err).code();
        let message = err.to_string();

        let details = match err {
            HollowError::FileNotFound { path } => Some(serde_json::json!({ "path": path })),
            HollowError::ParseError { file, .. } | HollowError::VerificationFailed { file, .. } => {
                Some(serde_json::json!({ "file": file }))
            }
            HollowError::ApplyError { file, .. } => {
                file.as_ref().map(|f| serde_json::json!({ "file": f }))
            }
            _ => None,
        };

        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &HollowError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }

    pub fn new(code: u8, message: impl Into<String>) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo {
                code,
                message: message.into(),
                details: None,
            },
        }
    }
}

// ============================================================================
// Emitters
// ============================================================================

/// Emit a response as pretty JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::FileTally;

    fn declaration(kind: DeclarationKind, name: &str) -> ChangedDeclaration {
        ChangedDeclaration {
            kind,
            name: name.to_string(),
            class: "Widget".to_string(),
            location: Location::new("src/Widget.cs", 4, 5),
        }
    }

    #[test]
    fn location_omits_absent_byte_offsets() {
        let json = serde_json::to_string(&Location::new("a.cs", 1, 1)).unwrap();
        assert!(!json.contains("byte_start"));

        let json = serde_json::to_string(&Location::new("a.cs", 1, 1).with_span(3, 9)).unwrap();
        assert!(json.contains("\"byte_start\":3"));
        assert!(json.contains("\"byte_end\":9"));
    }

    #[test]
    fn declaration_kind_is_lowercase() {
        let json = serde_json::to_string(&declaration(DeclarationKind::Operator, "+")).unwrap();
        assert!(json.contains("\"kind\":\"operator\""));
    }

    #[test]
    fn run_response_status_first() {
        let mut stats = RunStats::new(1);
        stats.record_modified(FileTally {
            classes: 1,
            methods: 1,
            operators: 1,
        });
        let report = FileReport::new(
            "src/Widget.cs",
            "modified",
            vec![
                declaration(DeclarationKind::Method, "Foo"),
                declaration(DeclarationKind::Operator, "=="),
            ],
            vec!["Widget".to_string()],
        );
        assert_eq!(report.count(DeclarationKind::Method), 1);

        let response = RunResponse::new("run", true, &stats, vec![report]);
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.starts_with("{\"status\":\"ok\""));
        assert!(json.contains("\"mode\":\"run\""));
        assert!(json.contains("\"methods_modified\":1"));
        assert!(!json.contains("\"diff\""));
    }

    #[test]
    fn run_response_reads_back_failed_files() {
        let mut stats = RunStats::new(1);
        stats.record_failed("src/Broken.cs", 6, "expected a statement, found end of file");
        stats.finish_root();

        let response = RunResponse::new("analyze", true, &stats, Vec::new());
        let json = serde_json::to_string(&response).unwrap();
        let parsed: RunResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.failed, stats.failed);
        assert_eq!(parsed.summary.files_failed, 1);
    }

    #[test]
    fn error_response_carries_code_and_details() {
        let err = HollowError::file_not_found("missing/");
        let response = ErrorResponse::from_error(&err);
        let value: serde_json::Value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"]["code"], 3);
        assert_eq!(value["error"]["details"]["path"], "missing/");
    }
}
