//! Binary entry point for the hollow CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Report trivially empty methods and operators, with a diff
//! hollow analyze src/ --diff
//!
//! # Rewrite them into extern declarations in place
//! hollow run src/ Bridge/ --jobs 8 --progress
//!
//! # Human-readable output instead of JSON
//! hollow --format text run src/
//! ```

use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use hollow::cli::{Mode, RunOptions, RunOutcome};
use hollow_core::error::{HollowError, OutputErrorCode};
use hollow_core::output::{emit_response, ErrorResponse};
use hollow_core::workspace::{DiscoveryConfig, DEFAULT_EXTENSION};

// ============================================================================
// CLI Structure
// ============================================================================

/// Rewrite trivially empty C# methods and operators into extern declarations.
///
/// A method whose body is empty, or that only returns `0`, `false`, `null`
/// or `default(T)`, gets the `extern` modifier and loses its body. Every
/// other byte of the file is kept. Output is JSON unless `--format text`.
#[derive(Parser, Debug)]
#[command(name = "hollow", version, about = "Turn empty C# stubs into extern declarations")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output (`RUST_LOG` takes precedence).
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show a progress bar on stderr.
    #[arg(long, global = true)]
    progress: bool,

    /// Number of worker threads (default: one per core).
    #[arg(long, short = 'j', global = true)]
    jobs: Option<usize>,

    /// File extension to process, without the dot. Repeatable.
    #[arg(long = "ext", global = true, value_name = "EXT")]
    extensions: Vec<String>,

    /// Glob pattern to exclude, relative to each root. Repeatable.
    #[arg(long, global = true, value_name = "GLOB")]
    exclude: Vec<String>,

    /// Follow symbolic links while walking directories.
    #[arg(long, global = true)]
    follow_symlinks: bool,

    /// Skip files larger than this many bytes.
    #[arg(long, global = true, value_name = "BYTES")]
    max_file_size: Option<u64>,

    /// Exit with code 4 if any file failed.
    #[arg(long, global = true)]
    strict: bool,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Output format for `analyze` and `run`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Full JSON response (default).
    #[default]
    Json,
    /// Per-file listing and statistics.
    Text,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Report eligible declarations without changing any file.
    Analyze {
        /// Files or directories to scan.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Include a unified diff of each would-be change.
        #[arg(long)]
        diff: bool,
    },
    /// Rewrite eligible declarations in place.
    Run {
        /// Files or directories to rewrite.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Include a unified diff of each change.
        #[arg(long)]
        diff: bool,
        /// Skip post-rewrite verification.
        #[arg(long)]
        no_verify: bool,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(code) => code,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON, like every other response
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<ExitCode, HollowError> {
    let (paths, options) = match cli.command {
        Command::Analyze { paths, diff } => {
            (paths, run_options(Mode::Analyze, &cli.global, diff, true))
        }
        Command::Run {
            paths,
            diff,
            no_verify,
        } => (paths, run_options(Mode::Run, &cli.global, diff, !no_verify)),
    };

    configure_jobs(cli.global.jobs)?;
    let config = discovery_config(&cli.global);
    let outcome = hollow::cli::execute(&paths, &config, &options)?;
    let failed = outcome.stats.has_failures();

    let mut stdout = io::stdout();
    match cli.global.format {
        OutputFormat::Json => emit_response(&outcome.into_response(&options), &mut stdout),
        OutputFormat::Text => stdout.write_all(render_text(&outcome).as_bytes()),
    }
    .map_err(|e| HollowError::internal(format!("failed to write output: {}", e)))?;

    if cli.global.strict && failed {
        return Ok(ExitCode::from(OutputErrorCode::ApplyError.code()));
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Helpers
// ============================================================================

fn run_options(mode: Mode, global: &GlobalArgs, diff: bool, verify: bool) -> RunOptions {
    RunOptions {
        mode,
        verify,
        diff,
        progress: global.progress,
    }
}

fn discovery_config(global: &GlobalArgs) -> DiscoveryConfig {
    let mut extensions: Vec<String> = global
        .extensions
        .iter()
        .map(|e| e.trim_start_matches('.').to_string())
        .filter(|e| !e.is_empty())
        .collect();
    if extensions.is_empty() {
        extensions.push(DEFAULT_EXTENSION.to_string());
    }

    DiscoveryConfig {
        extensions,
        exclude_patterns: global.exclude.clone(),
        follow_symlinks: global.follow_symlinks,
        max_file_size: global.max_file_size,
    }
}

/// Size the global rayon pool.
fn configure_jobs(jobs: Option<usize>) -> Result<(), HollowError> {
    let Some(jobs) = jobs else {
        return Ok(());
    };
    if jobs == 0 {
        return Err(HollowError::invalid_args("--jobs must be at least 1"));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build_global()
        .map_err(|e| HollowError::internal(format!("failed to set thread pool size: {}", e)))
}

/// Text rendering: one block per file, then the statistics.
fn render_text(outcome: &RunOutcome) -> String {
    let mut out = String::new();
    for report in &outcome.files {
        let _ = writeln!(out, "{} ({})", report.path, report.status);
        for decl in &report.declarations {
            let _ = writeln!(
                out,
                "  {}:{}  {} {}.{}",
                decl.location.line, decl.location.col, decl.kind, decl.class, decl.name
            );
        }
        if let Some(diff) = &report.diff {
            out.push_str(diff);
        }
    }
    if !outcome.files.is_empty() {
        out.push('\n');
    }
    out.push_str(&outcome.stats.render_text());
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use hollow_core::output::{ChangedDeclaration, DeclarationKind, FileReport, Location};
    use hollow_core::stats::{FileTally, RunStats};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    mod parsing {
        use super::*;

        #[test]
        fn analyze_with_diff() {
            let cli = parse(&["hollow", "analyze", "src", "lib", "--diff"]);
            match cli.command {
                Command::Analyze { paths, diff } => {
                    assert_eq!(paths, vec![PathBuf::from("src"), PathBuf::from("lib")]);
                    assert!(diff);
                }
                other => panic!("expected analyze, got {:?}", other),
            }
            assert_eq!(cli.global.format, OutputFormat::Json);
        }

        #[test]
        fn global_flags_after_subcommand() {
            let cli = parse(&[
                "hollow", "run", "src", "--no-verify", "--format", "text", "-j", "4", "--strict",
            ]);
            assert!(matches!(cli.command, Command::Run { no_verify: true, .. }));
            assert_eq!(cli.global.format, OutputFormat::Text);
            assert_eq!(cli.global.jobs, Some(4));
            assert!(cli.global.strict);
        }

        #[test]
        fn paths_are_required() {
            assert!(Cli::try_parse_from(["hollow", "run"]).is_err());
        }
    }

    mod config {
        use super::*;

        #[test]
        fn default_extension_is_cs() {
            let cli = parse(&["hollow", "analyze", "src"]);
            let config = discovery_config(&cli.global);
            assert_eq!(config.extensions, vec!["cs".to_string()]);
            assert!(config.exclude_patterns.is_empty());
        }

        #[test]
        fn extensions_lose_their_dot() {
            let cli = parse(&[
                "hollow", "analyze", "src", "--ext", ".cs", "--ext", "csx", "--exclude", "**/Generated/**",
            ]);
            let config = discovery_config(&cli.global);
            assert_eq!(config.extensions, vec!["cs".to_string(), "csx".to_string()]);
            assert_eq!(config.exclude_patterns, vec!["**/Generated/**".to_string()]);
        }

        #[test]
        fn zero_jobs_is_invalid() {
            let err = configure_jobs(Some(0)).unwrap_err();
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
        }

        #[test]
        fn no_verify_turns_verification_off() {
            let cli = parse(&["hollow", "run", "src", "--no-verify"]);
            let options = run_options(Mode::Run, &cli.global, false, false);
            assert!(!options.verify);
            assert_eq!(options.mode, Mode::Run);
        }
    }

    mod text {
        use super::*;

        #[test]
        fn lists_declarations_then_statistics() {
            let mut stats = RunStats::new(1);
            stats.record_modified(FileTally {
                classes: 1,
                methods: 1,
                operators: 0,
            });
            stats.finish_root();
            let report = FileReport::new(
                "Bridge.cs",
                "modified",
                vec![ChangedDeclaration {
                    kind: DeclarationKind::Method,
                    name: "Init".to_string(),
                    class: "NativeBridge".to_string(),
                    location: Location::new("Bridge.cs", 7, 9),
                }],
                vec!["NativeBridge".to_string()],
            );
            let outcome = RunOutcome {
                stats,
                files: vec![report],
            };

            let text = render_text(&outcome);
            assert!(text.starts_with("Bridge.cs (modified)\n  7:9  method NativeBridge.Init\n\n"));
            assert!(text.contains("1. Modified files: \t1"));
        }
    }
}
