//! Aggregate statistics for a rewrite run.
//!
//! Per-file results are produced independently (possibly in parallel) and
//! folded into a [`RunStats`] afterwards, so the counters are never shared
//! between workers.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// What one file contributed to the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FileTally {
    /// Classes containing at least one rewritten declaration.
    pub classes: u32,
    /// Rewritten method declarations.
    pub methods: u32,
    /// Rewritten operator declarations.
    pub operators: u32,
}

impl FileTally {
    pub fn is_empty(&self) -> bool {
        self.methods == 0 && self.operators == 0
    }
}

/// A file that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedFile {
    pub path: String,
    /// Error code from [`crate::error::OutputErrorCode`].
    pub code: u8,
    pub reason: String,
}

/// Counters for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub roots_total: u32,
    pub roots_processed: u32,
    pub files_processed: u32,
    pub files_modified: u32,
    pub classes_modified: u32,
    pub methods_modified: u32,
    pub operators_modified: u32,
    pub failed: Vec<FailedFile>,
}

impl RunStats {
    pub fn new(roots_total: usize) -> Self {
        RunStats {
            roots_total: roots_total as u32,
            ..Default::default()
        }
    }

    /// Record a file that parsed and needed no change.
    pub fn record_unchanged(&mut self) {
        self.files_processed += 1;
    }

    /// Record a file with at least one rewritten declaration.
    pub fn record_modified(&mut self, tally: FileTally) {
        self.files_processed += 1;
        if tally.is_empty() {
            return;
        }
        self.files_modified += 1;
        self.classes_modified += tally.classes;
        self.methods_modified += tally.methods;
        self.operators_modified += tally.operators;
    }

    /// Record a file that failed; it still counts as processed.
    pub fn record_failed(&mut self, path: impl Into<String>, code: u8, reason: impl Into<String>) {
        self.files_processed += 1;
        self.failed.push(FailedFile {
            path: path.into(),
            code,
            reason: reason.into(),
        });
    }

    /// Mark one root as fully processed.
    pub fn finish_root(&mut self) {
        self.roots_processed += 1;
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Human-readable summary block.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{}/{} directories have been processed, {} files.",
            self.roots_processed, self.roots_total, self.files_processed
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "Statistics:");
        let _ = writeln!(out, "1. Modified files: \t{}", self.files_modified);
        let _ = writeln!(out, "2. Modified classes: \t{}", self.classes_modified);
        let _ = writeln!(out, "3. Modified methods: \t{}", self.methods_modified);
        let _ = writeln!(out, "4. Modified operators: \t{}", self.operators_modified);

        if !self.failed.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "The following files were not processed due to errors:");
            for (i, failed) in self.failed.iter().enumerate() {
                let _ = writeln!(out, "{}. {} ({})", i + 1, failed.path, failed.reason);
            }
        }
        out
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modified_files_accumulate() {
        let mut stats = RunStats::new(1);
        stats.record_modified(FileTally {
            classes: 1,
            methods: 2,
            operators: 0,
        });
        stats.record_modified(FileTally {
            classes: 2,
            methods: 1,
            operators: 1,
        });
        stats.record_unchanged();

        assert_eq!(stats.files_processed, 3);
        assert_eq!(stats.files_modified, 2);
        assert_eq!(stats.classes_modified, 3);
        assert_eq!(stats.methods_modified, 3);
        assert_eq!(stats.operators_modified, 1);
    }

    #[test]
    fn empty_tally_is_not_a_modification() {
        let mut stats = RunStats::new(1);
        stats.record_modified(FileTally::default());
        assert_eq!(stats.files_processed, 1);
        assert_eq!(stats.files_modified, 0);
    }

    #[test]
    fn failures_are_listed_in_text() {
        let mut stats = RunStats::new(2);
        stats.record_failed("src/Broken.cs", 6, "unbalanced '{'");
        stats.finish_root();

        assert!(stats.has_failures());
        assert_eq!(stats.roots_processed, 1);
        let text = stats.render_text();
        assert!(text.starts_with("1/2 directories have been processed, 1 files.\n"));
        assert!(text.contains("1. Modified files: \t0"));
        assert!(text.contains("1. src/Broken.cs (unbalanced '{')"));
    }
}
