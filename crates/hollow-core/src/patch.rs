//! Spans, content hashes and span-based text edits.
//!
//! Declaration rewrites are produced at the tree level, but every change can
//! also be described as "replace bytes `[start, end)` of the original file
//! with new text". This module holds that text-level view:
//!
//! - [`Span`]: half-open byte range into file content
//! - [`ContentHash`]: SHA-256 of file content, used as a write precondition
//! - [`SpanEdit`] and [`apply_span_edits`]: apply a batch of non-overlapping
//!   replacements in one pass
//!
//! The CLI uses [`apply_span_edits`] as an independent oracle: the serialized
//! rewritten tree must equal the original text with the span edits applied.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::ops::Range;
use thiserror::Error;

/// Hash type for content verification (SHA-256, stored as hex string for JSON compatibility).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
    /// Compute SHA-256 hash of the given bytes, returning hex-encoded string.
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentHash(hex::encode(hasher.finalize()))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Span
// ============================================================================

/// Byte offsets into file content.
///
/// Spans are half-open intervals: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: u64,
    /// End byte offset (exclusive).
    pub end: u64,
}

impl Span {
    /// Create a new span.
    ///
    /// # Panics
    /// Panics if `start > end`.
    pub fn new(start: u64, end: u64) -> Self {
        assert!(
            start <= end,
            "Span start ({}) must be <= end ({})",
            start,
            end
        );
        Span { start, end }
    }

    /// Create a span from `usize` offsets, as produced by string scanning.
    pub fn from_offsets(start: usize, end: usize) -> Self {
        Span::new(start as u64, end as u64)
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if this span overlaps with another.
    ///
    /// Adjacent spans (one ends where another starts) do NOT overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The span as a `usize` range, for slicing.
    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// ============================================================================
// Span edits
// ============================================================================

/// Replace the bytes covered by `span` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEdit {
    pub span: Span,
    pub new_text: String,
}

impl SpanEdit {
    pub fn new(span: Span, new_text: impl Into<String>) -> Self {
        SpanEdit {
            span,
            new_text: new_text.into(),
        }
    }
}

/// Error type for span edit application.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpanEditError {
    /// An edit span extends beyond source length.
    #[error("span {span} is out of bounds for source of length {source_len}")]
    OutOfBounds { span: Span, source_len: usize },

    /// Two edits have overlapping spans.
    #[error("overlapping edits: {first} and {second}")]
    Overlapping { first: Span, second: Span },

    /// A span boundary falls inside a multi-byte character.
    #[error("span {span} does not fall on character boundaries")]
    NotCharBoundary { span: Span },
}

/// Apply a batch of replacements to `source` in a single pass.
///
/// Edits may be given in any order. They are validated (bounds, character
/// boundaries, overlap) before any text is produced, so the result is
/// all-or-nothing. Adjacent edits are allowed.
pub fn apply_span_edits(source: &str, edits: &[SpanEdit]) -> Result<String, SpanEditError> {
    let source_len = source.len();
    for edit in edits {
        let range = edit.span.range();
        if range.end > source_len {
            return Err(SpanEditError::OutOfBounds {
                span: edit.span,
                source_len,
            });
        }
        if !source.is_char_boundary(range.start) || !source.is_char_boundary(range.end) {
            return Err(SpanEditError::NotCharBoundary { span: edit.span });
        }
    }

    let mut ordered: Vec<&SpanEdit> = edits.iter().collect();
    ordered.sort_by_key(|edit| edit.span);

    for pair in ordered.windows(2) {
        if pair[0].span.overlaps(&pair[1].span) {
            return Err(SpanEditError::Overlapping {
                first: pair[0].span,
                second: pair[1].span,
            });
        }
    }

    let added: usize = ordered.iter().map(|e| e.new_text.len()).sum();
    let mut result = String::with_capacity(source_len + added);
    let mut cursor = 0usize;
    for edit in ordered {
        let range = edit.span.range();
        result.push_str(&source[cursor..range.start]);
        result.push_str(&edit.new_text);
        cursor = range.end;
    }
    result.push_str(&source[cursor..]);
    Ok(result)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_is_stable_hex() {
        let a = ContentHash::compute(b"void Foo() { }");
        let b = ContentHash::compute(b"void Foo() { }");
        assert_eq!(a, b);
        assert_eq!(a.0.len(), 64);
        assert_ne!(a, ContentHash::compute(b"void Foo();"));
    }

    #[test]
    fn span_overlap_excludes_adjacent() {
        let a = Span::new(0, 5);
        assert!(a.overlaps(&Span::new(4, 8)));
        assert!(!a.overlaps(&Span::new(5, 8)));
        assert_eq!(a.len(), 5);
    }

    #[test]
    #[should_panic(expected = "must be <= end")]
    fn span_rejects_inverted_bounds() {
        let _ = Span::new(4, 2);
    }

    #[test]
    fn apply_edits_out_of_order() {
        let source = "aaa bbb ccc";
        let edits = vec![
            SpanEdit::new(Span::new(8, 11), "C"),
            SpanEdit::new(Span::new(0, 3), "A"),
        ];
        assert_eq!(apply_span_edits(source, &edits).unwrap(), "A bbb C");
    }

    #[test]
    fn apply_edits_allows_adjacent() {
        let source = "abcdef";
        let edits = vec![
            SpanEdit::new(Span::new(0, 3), "x"),
            SpanEdit::new(Span::new(3, 6), "y"),
        ];
        assert_eq!(apply_span_edits(source, &edits).unwrap(), "xy");
    }

    #[test]
    fn apply_edits_rejects_overlap() {
        let edits = vec![
            SpanEdit::new(Span::new(0, 4), "x"),
            SpanEdit::new(Span::new(2, 6), "y"),
        ];
        let err = apply_span_edits("abcdef", &edits).unwrap_err();
        assert!(matches!(err, SpanEditError::Overlapping { .. }));
    }

    #[test]
    fn apply_edits_rejects_out_of_bounds() {
        let edits = vec![SpanEdit::new(Span::new(2, 60), "x")];
        let err = apply_span_edits("abc", &edits).unwrap_err();
        assert_eq!(
            err,
            SpanEditError::OutOfBounds {
                span: Span::new(2, 60),
                source_len: 3
            }
        );
    }

    #[test]
    fn apply_edits_rejects_split_character() {
        let edits = vec![SpanEdit::new(Span::new(1, 2), "x")];
        let err = apply_span_edits("é", &edits).unwrap_err();
        assert!(matches!(err, SpanEditError::NotCharBoundary { .. }));
    }

    #[test]
    fn apply_no_edits_is_identity() {
        assert_eq!(apply_span_edits("keep me", &[]).unwrap(), "keep me");
    }
}
