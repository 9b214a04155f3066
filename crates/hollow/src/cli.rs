//! Per-file pipeline behind `hollow analyze` and `hollow run`.
//!
//! Every file goes through the same steps:
//!
//! 1. read it and hash its content
//! 2. parse it and run [`externalize`] over the tree
//! 3. verify the rewritten text (unless disabled)
//! 4. build the report, and the unified diff when requested
//! 5. in `run` mode only, write the new text back atomically, provided the
//!    file on disk still has the hash read in step 1
//!
//! Files are independent, so [`execute`] processes them on the rayon pool and
//! folds the per-file outcomes into [`RunStats`] afterwards.
//!
//! ## Error Handling
//!
//! A file that fails any step is skipped and recorded in the run statistics
//! with the code of its [`HollowError`]; the other files are unaffected.
//! Only discovery errors (missing root, bad exclude pattern) abort a run.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use hollow_core::diff::{generate_unified_diff, line_bounds, OutputEdit};
use hollow_core::error::HollowError;
use hollow_core::output::{ChangedDeclaration, DeclarationKind, FileReport, Location, RunResponse};
use hollow_core::patch::{apply_span_edits, ContentHash, Span, SpanEdit};
use hollow_core::stats::{FileTally, RunStats};
use hollow_core::text::byte_offset_to_position;
use hollow_core::workspace::{DiscoveryConfig, SourceFile, SourceSet};
use hollow_cst::{externalize, parse_source, prettify_error, Codegen, Rewrite};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

// ============================================================================
// Options
// ============================================================================

/// Whether files are rewritten or only inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Report eligible declarations, touch nothing.
    Analyze,
    /// Rewrite files in place.
    Run,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Analyze => "analyze",
            Mode::Run => "run",
        }
    }
}

/// Options for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub mode: Mode,
    /// Check the rewritten text before reporting or writing it.
    pub verify: bool,
    /// Attach a unified diff to each file report.
    pub diff: bool,
    /// Show a progress bar on stderr.
    pub progress: bool,
}

impl RunOptions {
    pub fn new(mode: Mode) -> Self {
        RunOptions {
            mode,
            verify: true,
            diff: false,
            progress: false,
        }
    }
}

// ============================================================================
// Per-file processing
// ============================================================================

/// A file with at least one eligible declaration.
#[derive(Debug, Clone)]
pub struct FileChange {
    pub report: FileReport,
    pub tally: FileTally,
}

/// Process one file.
///
/// Returns `Ok(None)` when the file has nothing to rewrite; such a file is
/// never written, even in `run` mode.
///
/// # Errors
///
/// - `ParseError` if the file is not UTF-8 or does not parse
/// - `VerificationFailed` if the rewritten text fails a check
/// - `ApplyError` if the file changed on disk or could not be written
/// - `InternalError` for read failures and rewrite faults
pub fn process_file(file: &SourceFile, options: &RunOptions) -> Result<Option<FileChange>, HollowError> {
    let path = file.display_path.as_str();
    let bytes = fs::read(&file.path)
        .map_err(|e| HollowError::internal(format!("failed to read {}: {}", path, e)))?;
    let hash = ContentHash::compute(&bytes);
    let source = String::from_utf8(bytes)
        .map_err(|e| HollowError::parse(path, format!("not valid UTF-8: {}", e)))?;

    let tree = parse_source(&source).map_err(|e| {
        debug!("{}", prettify_error(&e, &source, path));
        let (line, col) = byte_offset_to_position(&source, e.offset());
        HollowError::parse(path, format!("{} (line {}, column {})", e, line, col))
    })?;

    let result =
        externalize(&tree).map_err(|e| HollowError::internal(format!("{}: {}", path, e)))?;
    let Some(rewritten) = result.outcome.tree() else {
        debug!("{}: nothing to externalize", path);
        return Ok(None);
    };
    let output = rewritten.to_source();

    if options.verify {
        verify(path, &source, &output, &result.changes)?;
    }

    let declarations = result
        .changes
        .iter()
        .map(|change| locate(path, &source, change))
        .collect();
    let tally = FileTally {
        classes: result.classes.len() as u32,
        methods: result.count(DeclarationKind::Method) as u32,
        operators: result.count(DeclarationKind::Operator) as u32,
    };
    let status = match options.mode {
        Mode::Analyze => "eligible",
        Mode::Run => "modified",
    };
    let mut report = FileReport::new(path, status, declarations, result.classes.clone());
    if options.diff {
        report = report.with_diff(render_diff(path, &source, &result.changes)?);
    }

    if options.mode == Mode::Run {
        write_if_unchanged(path, &file.path, &hash, &output)?;
        info!(
            "rewrote {} ({} methods, {} operators)",
            path, tally.methods, tally.operators
        );
    }

    Ok(Some(FileChange { report, tally }))
}

fn locate(path: &str, source: &str, change: &Rewrite) -> ChangedDeclaration {
    let (line, col) = byte_offset_to_position(source, change.span.start as usize);
    ChangedDeclaration {
        kind: change.kind,
        name: change.name.clone(),
        class: change.class.clone(),
        location: Location::new(path, line, col).with_span(change.span.start, change.span.end),
    }
}

/// Check `output` against two independent oracles.
///
/// The rewritten text must equal `source` with each change's replacement
/// spliced over its span, and running the rewrite again must change nothing.
fn verify(path: &str, source: &str, output: &str, changes: &[Rewrite]) -> Result<(), HollowError> {
    let edits: Vec<SpanEdit> = changes
        .iter()
        .map(|c| SpanEdit::new(c.full_span, c.replacement_text.clone()))
        .collect();
    let spliced = apply_span_edits(source, &edits)?;
    if spliced != output {
        return Err(HollowError::verification(
            path,
            "rewritten text differs from the original with the declaration edits applied",
        ));
    }

    let reparsed = parse_source(output).map_err(|e| {
        HollowError::verification(path, format!("rewritten text does not parse: {}", e))
    })?;
    let again =
        externalize(&reparsed).map_err(|e| HollowError::internal(format!("{}: {}", path, e)))?;
    if again.is_changed() {
        return Err(HollowError::verification(
            path,
            format!(
                "a second pass would rewrite {} more declarations",
                again.changes.len()
            ),
        ));
    }

    debug!("{}: verified {} rewrites", path, changes.len());
    Ok(())
}

// ============================================================================
// Diff
// ============================================================================

/// Changes whose whole-line ranges overlap, shown as one edit.
struct Hunk<'a> {
    span: Span,
    lines_end: usize,
    changes: Vec<&'a Rewrite>,
}

/// Unified diff of `changes` against `source`.
///
/// `changes` must be in source order, as [`externalize`] returns them.
fn render_diff(path: &str, source: &str, changes: &[Rewrite]) -> Result<String, HollowError> {
    let mut hunks: Vec<Hunk> = Vec::new();
    for change in changes {
        let lines = line_bounds(source, change.full_span);
        match hunks.last_mut() {
            Some(hunk) if lines.start < hunk.lines_end => {
                hunk.span.end = change.full_span.end;
                hunk.lines_end = hunk.lines_end.max(lines.end);
                hunk.changes.push(change);
            }
            _ => hunks.push(Hunk {
                span: change.full_span,
                lines_end: lines.end,
                changes: vec![change],
            }),
        }
    }

    let mut edits = Vec::with_capacity(hunks.len());
    for hunk in &hunks {
        let base = hunk.span.start;
        let shifted: Vec<SpanEdit> = hunk
            .changes
            .iter()
            .map(|c| {
                SpanEdit::new(
                    Span::new(c.full_span.start - base, c.full_span.end - base),
                    c.replacement_text.clone(),
                )
            })
            .collect();
        let replacement = apply_span_edits(&source[hunk.span.range()], &shifted)?;
        edits.push(OutputEdit::whole_lines(path, source, hunk.span, &replacement));
    }
    Ok(generate_unified_diff(&edits))
}

// ============================================================================
// Writing
// ============================================================================

/// Replace the file's content with `contents` if it still hashes to `expected`.
fn write_if_unchanged(
    display: &str,
    path: &Path,
    expected: &ContentHash,
    contents: &str,
) -> Result<(), HollowError> {
    let current = fs::read(path)
        .map_err(|e| HollowError::apply(display, format!("failed to re-read: {}", e)))?;
    if ContentHash::compute(&current) != *expected {
        return Err(HollowError::apply(
            display,
            "file changed on disk since it was read",
        ));
    }
    atomic_write(path, contents.as_bytes())
        .map_err(|e| HollowError::apply(display, format!("failed to write: {}", e)))
}

/// Write through a temp file in the same directory, then rename over `path`.
///
/// Readers see either the old or the new content. Permissions of the
/// original file are kept.
fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path)?.permissions();

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.as_file().set_permissions(permissions)?;
    temp.persist(path)?;
    Ok(())
}

// ============================================================================
// Whole runs
// ============================================================================

/// Statistics and reports of a finished run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub stats: RunStats,
    /// Reports of files with eligible declarations, in discovery order.
    pub files: Vec<FileReport>,
}

impl RunOutcome {
    pub fn into_response(self, options: &RunOptions) -> RunResponse {
        RunResponse::new(options.mode.as_str(), options.verify, &self.stats, self.files)
    }
}

/// Discover the files under `roots` and process all of them.
///
/// # Errors
///
/// Only discovery errors; per-file failures are recorded in the returned
/// statistics.
pub fn execute(
    roots: &[PathBuf],
    config: &DiscoveryConfig,
    options: &RunOptions,
) -> Result<RunOutcome, HollowError> {
    let set = SourceSet::discover(roots, config)?;
    if set.is_empty() {
        warn!("no source files found");
    }
    info!(
        "{} {} files under {} roots",
        options.mode.as_str(),
        set.len(),
        set.roots().len()
    );

    let bar = progress_bar(set.len(), options.progress);
    let results: Vec<Result<Option<FileChange>, HollowError>> = set
        .files()
        .par_iter()
        .map(|file| {
            let result = process_file(file, options);
            bar.inc(1);
            result
        })
        .collect();
    bar.finish_and_clear();

    Ok(fold(&set, results))
}

/// Fold per-file results into run statistics.
fn fold(set: &SourceSet, results: Vec<Result<Option<FileChange>, HollowError>>) -> RunOutcome {
    let mut stats = RunStats::new(set.roots().len());
    let mut files = Vec::new();

    for (file, result) in set.files().iter().zip(results) {
        match result {
            Ok(None) => stats.record_unchanged(),
            Ok(Some(change)) => {
                stats.record_modified(change.tally);
                files.push(change.report);
            }
            Err(err) => {
                warn!("skipping {}: {}", file.display_path, err);
                stats.record_failed(
                    file.display_path.as_str(),
                    err.error_code().code(),
                    err.to_string(),
                );
            }
        }
    }
    // Every file of every root has been visited by now.
    for _ in set.roots() {
        stats.finish_root();
    }

    RunOutcome { stats, files }
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    let style = ProgressStyle::with_template("{bar:40} {pos}/{len} files {elapsed}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}

// ============================================================================
// Tests
// ============================================================================
