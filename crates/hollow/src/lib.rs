//! hollow - rewrite trivially empty C# methods and operators into `extern`
//! declarations.
//!
//! This crate provides the `hollow` binary. The rewrite itself lives in
//! `hollow-cst`; this crate adds file discovery, parallel processing,
//! verification, reporting and safe writes.
//!
//! ## Modules
//!
//! - `cli` - the per-file pipeline and whole-run orchestration

pub mod cli;

// Re-export core types for convenience
pub use hollow_core::error::{HollowError, OutputErrorCode};
pub use hollow_core::output::{ErrorResponse, FileReport, RunResponse, SCHEMA_VERSION};
pub use hollow_core::workspace::DiscoveryConfig;
