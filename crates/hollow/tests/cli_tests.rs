//! CLI end-to-end tests.
//!
//! These tests spawn the actual `hollow` binary against temporary directories
//! and validate stdout, exit codes and the files left on disk.
//!
//! Exit code expectations:
//! - 0: Success (per-file failures included, unless `--strict`)
//! - 2: Invalid arguments
//! - 3: Resolution error (path not found)
//! - 4: Some file failed under `--strict`

use std::fs;
use std::path::Path;
use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

const BRIDGE: &str = "\
namespace Native
{
    public class Bridge
    {
        // Implemented by the host.
        public static void Init() { }
        public static int Version() { return 0; }
        public static int Add(int a, int b) { return a + b; }
        public static Bridge operator +(Bridge a, Bridge b) { return null; }
    }
}
";

const BRIDGE_REWRITTEN: &str = "\
namespace Native
{
    public class Bridge
    {
        // Implemented by the host.
        public static extern void Init();
        public static extern int Version();
        public static int Add(int a, int b) { return a + b; }
        public static extern Bridge operator +(Bridge a, Bridge b);
    }
}
";

/// Run hollow with given arguments and return (stdout, stderr, exit_code).
fn run_hollow(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_hollow"))
        .args(args)
        .output()
        .expect("failed to execute hollow");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn workspace(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    dir
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

fn json(stdout: &str) -> Value {
    serde_json::from_str(stdout).expect("stdout should be valid JSON")
}

// ============================================================================
// analyze
// ============================================================================

#[test]
fn analyze_reports_and_leaves_files_alone() {
    let dir = workspace(&[("Bridge.cs", BRIDGE)]);

    let (stdout, _stderr, code) = run_hollow(&["analyze", path_arg(dir.path())]);
    assert_eq!(code, 0);

    let response = json(&stdout);
    assert_eq!(response["status"], "ok");
    assert_eq!(response["mode"], "analyze");
    assert_eq!(response["summary"]["files_modified"], 1);
    assert_eq!(response["summary"]["methods_modified"], 2);
    assert_eq!(response["summary"]["operators_modified"], 1);
    assert_eq!(response["summary"]["classes_modified"], 1);

    let file = &response["files"][0];
    assert_eq!(file["path"], "Bridge.cs");
    assert_eq!(file["status"], "eligible");
    assert_eq!(file["classes"][0], "Bridge");
    assert_eq!(file["declarations"][0]["name"], "Init");
    assert_eq!(file["declarations"][0]["kind"], "method");
    assert_eq!(file["declarations"][0]["location"]["line"], 6);
    assert_eq!(file["declarations"][2]["kind"], "operator");
    assert!(file.get("diff").is_none());

    assert_eq!(
        fs::read_to_string(dir.path().join("Bridge.cs")).unwrap(),
        BRIDGE
    );
}

#[test]
fn analyze_diff_shows_each_change() {
    let dir = workspace(&[("Bridge.cs", BRIDGE)]);

    let (stdout, _stderr, code) = run_hollow(&["analyze", path_arg(dir.path()), "--diff"]);
    assert_eq!(code, 0);

    let response = json(&stdout);
    let diff = response["files"][0]["diff"].as_str().unwrap();
    assert!(diff.starts_with("--- a/Bridge.cs\n+++ b/Bridge.cs\n"));
    assert!(diff.contains("+        public static extern void Init();\n"));
    assert!(diff.contains("-        public static int Version() { return 0; }\n"));
    assert_eq!(diff.matches("@@ ").count(), 3);
}

// ============================================================================
// run
// ============================================================================

#[test]
fn run_rewrites_in_place() {
    let dir = workspace(&[("src/Bridge.cs", BRIDGE), ("src/Plain.cs", "class Plain { }\n")]);

    let (stdout, _stderr, code) = run_hollow(&["run", path_arg(dir.path())]);
    assert_eq!(code, 0);

    let response = json(&stdout);
    assert_eq!(response["mode"], "run");
    assert_eq!(response["verified"], true);
    assert_eq!(response["summary"]["files_processed"], 2);
    assert_eq!(response["files"][0]["path"], "src/Bridge.cs");
    assert_eq!(response["files"][0]["status"], "modified");

    assert_eq!(
        fs::read_to_string(dir.path().join("src/Bridge.cs")).unwrap(),
        BRIDGE_REWRITTEN
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("src/Plain.cs")).unwrap(),
        "class Plain { }\n"
    );
}

#[test]
fn second_run_changes_nothing() {
    let dir = workspace(&[("Bridge.cs", BRIDGE)]);

    let (_, _, code) = run_hollow(&["run", path_arg(dir.path())]);
    assert_eq!(code, 0);
    let (stdout, _, code) = run_hollow(&["run", path_arg(dir.path())]);
    assert_eq!(code, 0);

    let response = json(&stdout);
    assert_eq!(response["summary"]["files_modified"], 0);
    assert_eq!(
        fs::read_to_string(dir.path().join("Bridge.cs")).unwrap(),
        BRIDGE_REWRITTEN
    );
}

#[test]
fn excluded_and_foreign_files_are_skipped() {
    let dir = workspace(&[
        ("Bridge.cs", BRIDGE),
        ("Generated/Auto.cs", BRIDGE),
        ("obj/Debug/Temp.cs", BRIDGE),
        ("notes.txt", BRIDGE),
    ]);

    let (stdout, _, code) = run_hollow(&[
        "run",
        path_arg(dir.path()),
        "--exclude",
        "Generated/**",
        "--jobs",
        "2",
    ]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["summary"]["files_processed"], 1);

    for untouched in ["Generated/Auto.cs", "obj/Debug/Temp.cs", "notes.txt"] {
        assert_eq!(
            fs::read_to_string(dir.path().join(untouched)).unwrap(),
            BRIDGE,
            "{} should not be rewritten",
            untouched
        );
    }
}

#[test]
fn crlf_and_bom_survive() {
    let source = "\u{feff}class C\r\n{\r\n    void Foo() { }\r\n}\r\n";
    let dir = workspace(&[("C.cs", source)]);

    let (_, _, code) = run_hollow(&["run", path_arg(dir.path())]);
    assert_eq!(code, 0);
    assert_eq!(
        fs::read_to_string(dir.path().join("C.cs")).unwrap(),
        "\u{feff}class C\r\n{\r\n    extern void Foo();\r\n}\r\n"
    );
}

// ============================================================================
// Failures and exit codes
// ============================================================================

#[test]
fn parse_failure_is_recorded_and_others_proceed() {
    let dir = workspace(&[("Bridge.cs", BRIDGE), ("Broken.cs", "class Broken {\n")]);

    let (stdout, _, code) = run_hollow(&["run", path_arg(dir.path())]);
    assert_eq!(code, 0);

    let response = json(&stdout);
    assert_eq!(response["summary"]["files_failed"], 1);
    assert_eq!(response["failed"][0]["path"], "Broken.cs");
    assert_eq!(response["failed"][0]["code"], 6);
    assert_eq!(
        fs::read_to_string(dir.path().join("Bridge.cs")).unwrap(),
        BRIDGE_REWRITTEN
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("Broken.cs")).unwrap(),
        "class Broken {\n"
    );
}

#[test]
fn truncated_file_is_recorded_and_others_proceed() {
    let truncated = "class Cut\n{\n    void F()\n    {\n        if (ready)";
    let dir = workspace(&[("Bridge.cs", BRIDGE), ("Cut.cs", truncated)]);

    let (stdout, _, code) = run_hollow(&["run", path_arg(dir.path())]);
    assert_eq!(code, 0);

    let response = json(&stdout);
    assert_eq!(response["summary"]["files_processed"], 2);
    assert_eq!(response["summary"]["files_failed"], 1);
    assert_eq!(response["failed"][0]["path"], "Cut.cs");
    assert_eq!(response["failed"][0]["code"], 6);
    assert_eq!(
        fs::read_to_string(dir.path().join("Bridge.cs")).unwrap(),
        BRIDGE_REWRITTEN
    );
    assert_eq!(fs::read_to_string(dir.path().join("Cut.cs")).unwrap(), truncated);
}

#[test]
fn strict_turns_failures_into_exit_4() {
    let dir = workspace(&[("Broken.cs", "class Broken {\n")]);

    let (stdout, _, code) = run_hollow(&["run", path_arg(dir.path()), "--strict"]);
    assert_eq!(code, 4);
    assert_eq!(json(&stdout)["status"], "ok");
}

#[test]
fn missing_path_exits_3() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");

    let (stdout, _, code) = run_hollow(&["analyze", path_arg(&missing)]);
    assert_eq!(code, 3);

    let response = json(&stdout);
    assert_eq!(response["status"], "error");
    assert_eq!(response["error"]["code"], 3);
}

#[test]
fn bad_exclude_pattern_exits_2() {
    let dir = workspace(&[("Bridge.cs", BRIDGE)]);

    let (stdout, _, code) = run_hollow(&["analyze", path_arg(dir.path()), "--exclude", "[oops"]);
    assert_eq!(code, 2);
    assert_eq!(json(&stdout)["error"]["code"], 2);
}

#[test]
fn zero_jobs_exits_2() {
    let dir = workspace(&[("Bridge.cs", BRIDGE)]);

    let (_, _, code) = run_hollow(&["analyze", path_arg(dir.path()), "--jobs", "0"]);
    assert_eq!(code, 2);
}

// ============================================================================
// Text output
// ============================================================================

#[test]
fn text_format_prints_statistics() {
    let dir = workspace(&[("Bridge.cs", BRIDGE)]);

    let (stdout, _, code) = run_hollow(&["--format", "text", "analyze", path_arg(dir.path())]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("Bridge.cs (eligible)\n"));
    assert!(stdout.contains("  6:9  method Bridge.Init\n"));
    assert!(stdout.contains("1/1 directories have been processed, 1 files."));
    assert!(stdout.contains("3. Modified methods: \t2"));
    assert!(stdout.contains("4. Modified operators: \t1"));
}
