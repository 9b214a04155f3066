// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! End-to-end tests for the `extern` rewrite.
//!
//! Each test parses C#, runs [`externalize`], and checks the generated text.
//! Fixture pairs live in `tests/fixtures/` as `<name>.cs` and
//! `<name>.expected.cs`.

use std::path::PathBuf;

use difference::assert_diff;
use hollow_core::output::DeclarationKind;
use hollow_core::patch::{apply_span_edits, SpanEdit};
use hollow_cst::{
    externalize, parse_source, transform_declaration, BatchOutcome, Codegen, DeclId, DeclKind,
    Externalized, RewriteError,
};
use itertools::Itertools;

fn visualize(s: &str) -> String {
    s.replace(' ', "▩").replace('\t', "→").lines().join("↩\n")
}

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", name, e))
}

/// Run the rewrite and return the result with the generated text.
fn rewrite(source: &str) -> (Externalized, String) {
    let tree = parse_source(source).expect("parse error");
    let result = externalize(&tree).expect("rewrite error");
    let text = match &result.outcome {
        BatchOutcome::Changed(rewritten) => rewritten.to_source(),
        BatchOutcome::Unchanged => source.to_string(),
    };
    (result, text)
}

fn assert_rewrites_to(input: &str, expected: &str) {
    let (_, got) = rewrite(input);
    if got != expected {
        let expected_vis = visualize(expected);
        let got_vis = visualize(&got);
        assert_diff!(expected_vis.as_ref(), got_vis.as_ref(), "", 0);
    }
}

fn assert_fixture(name: &str) {
    let input = read_fixture(&format!("{}.cs", name));
    let expected = read_fixture(&format!("{}.expected.cs", name));
    assert_rewrites_to(&input, &expected);
}

/// The generated text must equal the original with each change spliced in.
fn assert_matches_span_edits(source: &str) {
    let (result, got) = rewrite(source);
    let edits: Vec<SpanEdit> = result
        .changes
        .iter()
        .map(|c| SpanEdit::new(c.full_span, c.replacement_text.clone()))
        .collect();
    let spliced = apply_span_edits(source, &edits).expect("span edits apply");
    assert_eq!(got, spliced);
}

fn in_class(member: &str) -> String {
    format!("class C\n{{\n    {}\n}}\n", member)
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn empty_void_method() {
    assert_rewrites_to(&in_class("void Foo() { }"), &in_class("extern void Foo();"));
}

#[test]
fn trivial_int_return() {
    assert_rewrites_to(&in_class("int Bar() { return 0; }"), &in_class("extern int Bar();"));
}

#[test]
fn modifiers_are_kept_in_order() {
    assert_rewrites_to(
        &in_class("public static bool Baz() { return false; }"),
        &in_class("public static extern bool Baz();"),
    );
}

#[test]
fn abstract_method_is_unchanged() {
    let source = in_class("abstract void Qux();");
    let (result, text) = rewrite(&source);
    assert!(!result.is_changed());
    assert_eq!(text, source);
}

#[test]
fn real_body_is_unchanged() {
    let source = in_class("int Sum(int a, int b) { return a + b; }");
    let (result, _) = rewrite(&source);
    assert!(!result.is_changed());
}

#[test]
fn comment_and_indentation_move_before_extern() {
    assert_rewrites_to(
        "class C\n{\n    // does nothing\n    void Foo() { }\n}\n",
        "class C\n{\n    // does nothing\n    extern void Foo();\n}\n",
    );
}

// =============================================================================
// Fixtures
// =============================================================================

#[test]
fn fixture_stubs() {
    assert_fixture("stubs");
}

#[test]
fn fixture_layout() {
    assert_fixture("layout");
}

#[test]
fn fixture_crlf_bom() {
    assert_fixture("crlf_bom");
}

#[test]
fn fixture_stubs_report() {
    let (result, _) = rewrite(&read_fixture("stubs.cs"));
    let names = result.changes.iter().map(|c| c.name.as_str()).collect::<Vec<_>>();
    assert_eq!(
        names,
        vec!["Init", "Version", "IsReady", "Name", "Create", "+", "=="]
    );
    assert_eq!(result.count(DeclarationKind::Method), 5);
    assert_eq!(result.count(DeclarationKind::Operator), 2);
    assert_eq!(result.classes, vec!["NativeBridge".to_string()]);
}

#[test]
fn fixture_layout_report() {
    let (result, _) = rewrite(&read_fixture("layout.cs"));
    assert_eq!(
        result.classes,
        vec!["Widget".to_string(), "Widget.Nested".to_string()]
    );
    let points = result
        .changes
        .iter()
        .filter(|c| c.class == "Widget.Nested")
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(points, vec!["Inner", "Move", "X"]);
}

#[test]
fn conditional_branches_are_rewritten() {
    let (result, text) = rewrite(&read_fixture("modern.cs"));
    let names = result.changes.iter().map(|c| c.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["DebugOnly"]);
    assert!(text.contains("        #if DEBUG\n        public extern void DebugOnly();\n        #endif\n"));
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn second_pass_changes_nothing() {
    for name in ["stubs.cs", "layout.cs", "crlf_bom.cs", "modern.cs"] {
        let (_, once) = rewrite(&read_fixture(name));
        let (again, twice) = rewrite(&once);
        assert!(!again.is_changed(), "{} changed on the second pass", name);
        assert_eq!(once, twice);
    }
}

#[test]
fn output_is_original_with_changes_spliced_in() {
    for name in ["stubs.cs", "layout.cs", "crlf_bom.cs", "modern.cs"] {
        assert_matches_span_edits(&read_fixture(name));
    }
}

#[test]
fn untouched_declarations_keep_their_bytes() {
    let source = read_fixture("stubs.cs");
    let tree = parse_source(&source).unwrap();
    let result = externalize(&tree).unwrap();
    let rewritten = result.outcome.tree().unwrap();
    let changed = result.changes.iter().map(|c| c.id).collect::<Vec<_>>();

    for (id, decl) in tree.decls() {
        if changed.contains(&id) {
            continue;
        }
        assert!(rewritten.shares_decl(&tree, id));
        assert_eq!(rewritten.decl(id).unwrap().to_source(), decl.to_source());
    }
}

#[test]
fn rewritten_shape() {
    let (result, _) = rewrite(&in_class("public static int Bar() { return 0; }"));
    let text = &result.changes[0].replacement_text;
    assert_eq!(text.matches("extern").count(), 1);
    assert_eq!(text.matches(';').count(), 1);
    assert!(!text.contains('{'));
    assert!(text.contains("public static extern int"));
}

// =============================================================================
// Scope
// =============================================================================

#[test]
fn only_class_members_are_candidates() {
    let source = "struct S { void F() { } }\nrecord R { void G() { } }\ninterface I { void H() { } }\n";
    let (result, text) = rewrite(source);
    assert!(!result.is_changed());
    assert_eq!(text, source);
}

#[test]
fn arrow_bodies_are_unchanged() {
    let source = in_class("int Zero() => 0;");
    let (result, _) = rewrite(&source);
    assert!(!result.is_changed());
}

#[test]
fn constructors_are_rejected_by_the_transformation() {
    let tree = parse_source(&in_class("public C() { }")).unwrap();
    let decl = tree.decl(DeclId(0)).unwrap();
    assert_eq!(decl.kind(), DeclKind::Constructor);
    assert!(matches!(
        transform_declaration(decl),
        Err(RewriteError::UnsupportedDeclarationKind {
            kind: DeclKind::Constructor
        })
    ));
}

#[test]
fn input_tree_survives_the_rewrite() {
    let source = in_class("void Foo() { }");
    let tree = parse_source(&source).unwrap();
    let _ = externalize(&tree).unwrap();
    assert_eq!(tree.to_source(), source);
}
