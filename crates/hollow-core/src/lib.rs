//! Core infrastructure for hollow.
//!
//! This crate provides the language-agnostic pieces of a rewrite run:
//!
//! - `error`: Unified error type and exit codes
//! - `output`: JSON output types (the agent contract)
//! - `patch`: Spans, content hashes and span edits
//! - `text`: Byte offset / line-column conversion
//! - `workspace`: Source file discovery
//! - `stats`: Run statistics
//! - `diff`: Unified diff generation

pub mod diff;
pub mod error;
pub mod output;
pub mod patch;
pub mod stats;
pub mod text;
pub mod workspace;
