// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Tokens and the trivia attached to them.
//!
//! Trivia follows the Roslyn attachment model:
//!
//! ```text
//! <leading trivia> TOKEN <trailing trivia>
//! ```
//!
//! - trailing trivia is everything after the token on the same line, up to and
//!   including the first end-of-line
//! - everything else before a token is its leading trivia
//!
//! Tokens are values. Every operation here returns new tokens and leaves its
//! inputs untouched.

use std::fmt;

// ============================================================================
// Trivia
// ============================================================================

/// Kind of a formatting atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriviaKind {
    /// A run of spaces, tabs or other non-newline whitespace.
    Whitespace,
    /// `\n`, `\r\n` or `\r`.
    EndOfLine,
    /// `// ...` (including `///` doc comments), without the line break.
    SingleLineComment,
    /// `/* ... */`, possibly spanning lines.
    MultiLineComment,
    /// A preprocessor line such as `#region` or `#if DEBUG`, without the line break.
    Directive,
    /// UTF-8 byte order mark at the start of a file.
    ByteOrderMark,
}

/// One formatting atom with its literal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Trivia {
    pub kind: TriviaKind,
    pub text: String,
}

impl Trivia {
    pub fn new(kind: TriviaKind, text: impl Into<String>) -> Self {
        Trivia {
            kind,
            text: text.into(),
        }
    }

    /// A single space, the separator synthesized by rewrites.
    pub fn space() -> Self {
        Trivia::new(TriviaKind::Whitespace, " ")
    }

    /// Whitespace or a line break.
    pub fn is_layout(&self) -> bool {
        matches!(self.kind, TriviaKind::Whitespace | TriviaKind::EndOfLine)
    }
}

/// Which side of a token trivia is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriviaSide {
    Leading,
    Trailing,
}

// ============================================================================
// Token
// ============================================================================

/// Lexical class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Reserved keyword (`void`, `class`, `return`, ...).
    Keyword,
    /// Identifier or contextual keyword (`partial`, `record`, `@class`, ...).
    Identifier,
    NumericLiteral,
    /// Any string form: regular, verbatim, interpolated, raw.
    StringLiteral,
    CharLiteral,
    Punctuation,
    /// Zero-width token that owns the trivia at the end of the file.
    EndOfFile,
}

/// A token with its leading and trailing trivia.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub leading: Vec<Trivia>,
    pub trailing: Vec<Trivia>,
}

impl Token {
    /// A token without trivia.
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Token {
            kind,
            text: text.into(),
            leading: Vec::new(),
            trailing: Vec::new(),
        }
    }

    /// A bare `;`.
    pub fn semicolon() -> Self {
        Token::new(TokenKind::Punctuation, ";")
    }

    pub fn keyword(text: &str) -> Self {
        Token::new(TokenKind::Keyword, text)
    }

    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }

    pub fn is_punct(&self, text: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.text == text
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::EndOfFile
    }

    /// Identifier or keyword.
    pub fn is_word(&self) -> bool {
        matches!(self.kind, TokenKind::Identifier | TokenKind::Keyword)
    }

    pub fn trivia(&self, side: TriviaSide) -> &[Trivia] {
        match side {
            TriviaSide::Leading => &self.leading,
            TriviaSide::Trailing => &self.trailing,
        }
    }

    /// A copy of this token with `side` replaced.
    pub fn with_trivia(&self, side: TriviaSide, trivia: Vec<Trivia>) -> Self {
        let mut token = self.clone();
        match side {
            TriviaSide::Leading => token.leading = trivia,
            TriviaSide::Trailing => token.trailing = trivia,
        }
        token
    }

    pub fn with_leading(&self, trivia: Vec<Trivia>) -> Self {
        self.with_trivia(TriviaSide::Leading, trivia)
    }

    pub fn with_trailing(&self, trivia: Vec<Trivia>) -> Self {
        self.with_trivia(TriviaSide::Trailing, trivia)
    }

    /// Byte length of the leading trivia.
    pub fn leading_len(&self) -> usize {
        self.leading.iter().map(|t| t.text.len()).sum()
    }

    /// Byte length of the trailing trivia.
    pub fn trailing_len(&self) -> usize {
        self.trailing.iter().map(|t| t.text.len()).sum()
    }

    /// Byte length including trivia.
    pub fn full_len(&self) -> usize {
        self.leading_len() + self.text.len() + self.trailing_len()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// ============================================================================
// Trivia relocation
// ============================================================================

/// Move the trivia on `side` of `from` onto the same side of `to`.
///
/// Returns `(from', to')`. `from'` is left holding only `delimiter` on that
/// side. The moved trivia sits on the outer edge of `to`: before its existing
/// leading trivia, or after its existing trailing trivia.
///
/// When `from` has no trivia on `side` nothing moves and both tokens are
/// returned unchanged; callers decide whether a separator is still needed.
pub fn move_trivia(
    from: &Token,
    to: &Token,
    side: TriviaSide,
    delimiter: Option<Trivia>,
) -> (Token, Token) {
    let moved = from.trivia(side);
    if moved.is_empty() {
        return (from.clone(), to.clone());
    }

    let existing = to.trivia(side);
    let mut combined = Vec::with_capacity(moved.len() + existing.len());
    match side {
        TriviaSide::Leading => {
            combined.extend_from_slice(moved);
            combined.extend_from_slice(existing);
        }
        TriviaSide::Trailing => {
            combined.extend_from_slice(existing);
            combined.extend_from_slice(moved);
        }
    }

    let from = from.with_trivia(side, delimiter.into_iter().collect());
    let to = to.with_trivia(side, combined);
    (from, to)
}

// ============================================================================
// Tests
// ============================================================================
