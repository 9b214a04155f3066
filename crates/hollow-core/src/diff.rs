//! Unified diff generation utilities.
//!
//! Provides functions to generate standard unified diff format from edit information.

use std::ops::Range;

use serde::Serialize;

use crate::patch::Span;
use crate::text::{byte_offset_to_position, line_count};

/// A single replacement, located for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputEdit {
    pub file: String,
    /// Span in the original file.
    pub span: Span,
    pub old_text: String,
    pub new_text: String,
    /// 1-indexed line of `span.start`.
    pub line: u32,
    /// 1-indexed column of `span.start`.
    pub col: u32,
}

impl OutputEdit {
    /// Build a display edit that covers whole lines.
    ///
    /// `span` is widened to start at the beginning of its first line and end
    /// after the newline of its last line; `replacement` is padded with the
    /// same surrounding text so the hunk shows complete lines.
    pub fn whole_lines(file: impl Into<String>, source: &str, span: Span, replacement: &str) -> Self {
        let range = span.range();
        let Range { start, end } = line_bounds(source, span);

        let mut new_text = String::with_capacity(end - start + replacement.len());
        new_text.push_str(&source[start..range.start]);
        new_text.push_str(replacement);
        new_text.push_str(&source[range.end..end]);

        let (line, col) = byte_offset_to_position(source, start);
        OutputEdit {
            file: file.into(),
            span: Span::from_offsets(start, end),
            old_text: source[start..end].to_string(),
            new_text,
            line,
            col,
        }
    }
}

/// Byte range of the whole lines `span` touches.
///
/// A span that already ends just after a newline is not widened past it.
pub fn line_bounds(source: &str, span: Span) -> Range<usize> {
    let range = span.range();
    let start = source[..range.start].rfind('\n').map_or(0, |i| i + 1);
    let end = if range.end > start && source.as_bytes()[range.end - 1] == b'\n' {
        range.end
    } else {
        match source[range.end..].find('\n') {
            Some(i) => range.end + i + 1,
            None => source.len(),
        }
    };
    start..end
}

/// Generate a unified diff from edit information.
///
/// Groups edits by file (in first-seen order) and emits one hunk per edit,
/// sorted by position. New-side line numbers account for the line delta of
/// earlier hunks in the same file.
pub fn generate_unified_diff(edits: &[OutputEdit]) -> String {
    let mut by_file: Vec<(&str, Vec<&OutputEdit>)> = Vec::new();
    for edit in edits {
        match by_file.iter_mut().find(|(file, _)| *file == edit.file) {
            Some((_, group)) => group.push(edit),
            None => by_file.push((&edit.file, vec![edit])),
        }
    }

    let mut diff = String::new();
    for (file, mut file_edits) in by_file {
        file_edits.sort_by_key(|e| e.span);
        diff.push_str(&format!("--- a/{}\n", file));
        diff.push_str(&format!("+++ b/{}\n", file));

        let mut delta: i64 = 0;
        for edit in file_edits {
            let old_lines = line_count(&edit.old_text);
            let new_lines = line_count(&edit.new_text);
            let new_start = (edit.line as i64 + delta).max(1);
            diff.push_str(&format!(
                "@@ -{},{} +{},{} @@\n",
                edit.line, old_lines, new_start, new_lines
            ));
            push_prefixed(&mut diff, '-', &edit.old_text);
            push_prefixed(&mut diff, '+', &edit.new_text);
            delta += new_lines as i64 - old_lines as i64;
        }
    }

    diff
}

fn push_prefixed(out: &mut String, prefix: char, text: &str) {
    for line in text.lines() {
        out.push(prefix);
        out.push_str(line);
        out.push('\n');
    }
    if !text.is_empty() && !text.ends_with('\n') {
        out.push_str("\\ No newline at end of file\n");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(file: &str, start: u64, old: &str, new: &str, line: u32) -> OutputEdit {
        OutputEdit {
            file: file.to_string(),
            span: Span::new(start, start + old.len() as u64),
            old_text: old.to_string(),
            new_text: new.to_string(),
            line,
            col: 1,
        }
    }

    #[test]
    fn single_edit_single_file() {
        let diff = generate_unified_diff(&[edit(
            "A.cs",
            10,
            "    void Foo() { }\n",
            "    extern void Foo();\n",
            3,
        )]);

        assert!(diff.starts_with("--- a/A.cs\n+++ b/A.cs\n"));
        assert!(diff.contains("@@ -3,1 +3,1 @@"));
        assert!(diff.contains("-    void Foo() { }\n"));
        assert!(diff.contains("+    extern void Foo();\n"));
    }

    #[test]
    fn multi_line_hunks_shift_new_side() {
        let diff = generate_unified_diff(&[
            edit("A.cs", 80, "    int B()\n    { return 0; }\n", "    extern int B();\n", 9),
            edit("A.cs", 10, "    void A()\n    {\n    }\n", "    extern void A();\n", 2),
        ]);

        assert!(diff.contains("@@ -2,3 +2,1 @@"));
        assert!(diff.contains("@@ -9,2 +7,1 @@"));
        assert!(diff.find("-2,3").unwrap() < diff.find("-9,2").unwrap());
    }

    #[test]
    fn files_keep_first_seen_order() {
        let diff = generate_unified_diff(&[
            edit("b.cs", 0, "x\n", "y\n", 1),
            edit("a.cs", 0, "x\n", "y\n", 1),
        ]);
        assert!(diff.find("--- a/b.cs").unwrap() < diff.find("--- a/a.cs").unwrap());
    }

    #[test]
    fn whole_lines_widens_span() {
        let source = "class C\n{\n    void Foo() { }\n}\n";
        let start = source.find("void").unwrap();
        let end = source.find("}\n}").unwrap() + 1;
        let e = OutputEdit::whole_lines("C.cs", source, Span::from_offsets(start, end), "extern void Foo();");

        assert_eq!(e.old_text, "    void Foo() { }\n");
        assert_eq!(e.new_text, "    extern void Foo();\n");
        assert_eq!((e.line, e.col), (3, 1));
    }

    #[test]
    fn line_bounds_stops_at_span_newline() {
        let source = "a\n    b\nc\n";
        let b = source.find("    b").unwrap();
        assert_eq!(line_bounds(source, Span::from_offsets(b, b + 6)), b..b + 6);
        assert_eq!(line_bounds(source, Span::from_offsets(b + 4, b + 5)), b..b + 6);
        assert_eq!(line_bounds(source, Span::from_offsets(0, 0)), 0..2);
    }

    #[test]
    fn missing_final_newline_is_marked() {
        let diff = generate_unified_diff(&[edit("A.cs", 0, "void F() { }", "extern void F();", 1)]);
        assert!(diff.contains("\\ No newline at end of file"));
    }

    #[test]
    fn empty_edits_produce_empty_diff() {
        assert!(generate_unified_diff(&[]).is_empty());
    }
}
