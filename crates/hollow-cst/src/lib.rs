// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! A lossless C# syntax tree and the declaration rewrite engine.
//!
//! # Overview
//!
//! - **Tokenizing**: [`tokenize`] splits source into tokens that carry their
//!   surrounding whitespace, comments and directives as trivia.
//! - **Parsing**: [`parse_source`] builds a [`Tree`] in which every method-like
//!   member is an arena entry addressed by [`DeclId`].
//! - **Code Generation**: the [`Codegen`] trait turns a tree back into text.
//!   Parsing then generating is the identity.
//! - **Rewriting**: [`externalize`] turns every method and operator with a
//!   trivially empty body into an `extern` declaration.
//!
//! # Quick Start
//!
//! ```
//! use hollow_cst::{externalize, parse_source, BatchOutcome, Codegen};
//!
//! let source = "class C\n{\n    int Zero() { return 0; }\n}\n";
//! let tree = parse_source(source).expect("parse error");
//! assert_eq!(tree.to_source(), source);
//!
//! let result = externalize(&tree).expect("rewrite error");
//! let BatchOutcome::Changed(rewritten) = result.outcome else {
//!     panic!("expected a change");
//! };
//! assert_eq!(
//!     rewritten.to_source(),
//!     "class C\n{\n    extern int Zero();\n}\n"
//! );
//! ```

use std::cmp::{max, min};

// ============================================================================
// Public modules and re-exports
// ============================================================================

mod nodes;
pub use nodes::*;

/// Tokenizer for C# source code.
pub mod tokenizer;
pub use tokenizer::TokError;

mod parser;
pub use parser::{ParserError, Result};

/// Rewrites over parsed trees.
pub mod visitor;
pub use visitor::{
    apply, externalize, insert_modifier, is_eligible, remove_body, transform_declaration,
    BatchEditError, BatchOutcome, Externalized, ReplacementSet, RewriteError, Rewrite,
    EXTERN_KEYWORD, TRIVIAL_RETURN_VALUES,
};

// ============================================================================
// Parsing functions
// ============================================================================

/// Tokenizes C# source code.
///
/// The last token is always end-of-file; it holds the trivia after the last
/// real token.
///
/// # Example
///
/// ```
/// use hollow_cst::tokenize;
///
/// let tokens = tokenize("int x;").expect("tokenize error");
/// assert_eq!(tokens.len(), 4);
/// ```
pub fn tokenize(text: &str) -> std::result::Result<Vec<Token>, TokError> {
    tokenizer::tokenize(text)
}

/// Parses a C# source file.
///
/// # Errors
///
/// Returns [`ParserError::TokenizerError`] for malformed tokens, and
/// [`ParserError::UnclosedDelimiter`] or [`ParserError::UnexpectedToken`]
/// when brackets do not balance.
pub fn parse_source(text: &str) -> Result<Tree> {
    let tokens = tokenize(text)?;
    parser::parse_tokens(tokens)
}

// ============================================================================
// Error formatting
// ============================================================================

/// Returns the byte offset of the beginning of line `n` (1-indexed).
fn bol_offset(source: &str, n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    source
        .match_indices('\n')
        .nth(n - 2)
        .map(|(index, _)| index + 1)
        .unwrap_or(source.len())
}

/// 1-indexed line containing byte `offset`.
fn line_of(source: &str, offset: usize) -> usize {
    let offset = min(offset, source.len());
    memchr::memchr_iter(b'\n', &source.as_bytes()[..offset]).count() + 1
}

/// Formats a parser error with the surrounding source lines.
///
/// # Example
///
/// ```
/// use hollow_cst::{parse_source, prettify_error};
///
/// let source = "class C {\n    void F() {\n}\n";
/// if let Err(e) = parse_source(source) {
///     let formatted = prettify_error(&e, source, "Broken.cs");
///     assert!(formatted.contains("Broken.cs"));
/// }
/// ```
pub fn prettify_error(err: &ParserError, source: &str, label: &str) -> String {
    use annotate_snippets::{Level, Renderer, Snippet};

    let context = 1;
    let offset = min(err.offset(), source.len());
    let line = line_of(source, offset);
    let line_start = max(1, line.saturating_sub(context));
    let start_offset = bol_offset(source, line_start);
    let end_offset = bol_offset(source, line + context + 1);
    let snippet = &source[start_offset..end_offset];

    let start = offset - start_offset;
    let end = min(start + 1, snippet.len());
    let start = min(start, end);

    Renderer::styled()
        .render(
            Level::Error.title(label).snippet(
                Snippet::source(snippet)
                    .line_start(line_start)
                    .fold(false)
                    .annotations(vec![Level::Error.span(start..end).label(&err.label())]),
            ),
        )
        .to_string()
}

// ============================================================================
// Tests
// ============================================================================
