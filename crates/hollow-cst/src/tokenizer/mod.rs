// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! C# tokenizer with full trivia.
//!
//! Produces every token of a file, each carrying its leading and trailing
//! trivia, followed by a zero-width end-of-file token. Concatenating
//! `leading + text + trailing` over all tokens reproduces the input exactly.
//!
//! The tokenizer is lexical only. Preprocessor directives become
//! [`TriviaKind::Directive`] trivia; code in inactive `#if` branches is
//! tokenized like any other code.

use memchr::{memchr2, memmem};
use thiserror::Error;

use crate::nodes::trivia::{Token, TokenKind, Trivia, TriviaKind};


/// Reserved C# keywords. Contextual keywords (`var`, `partial`, `record`,
/// `async`, ...) are identifiers.
pub const KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// Punctuators, longest first.
const PUNCTUATION: &[&str] = &[
    ">>>=", ">>>", "<<=", ">>=", "??=", "->", "=>", "==", "!=", "<=", ">=", "&&", "||", "++",
    "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>", "::", "??", "?.", "..",
    "{", "}", "(", ")", "[", "]", ";", ",", ".", ":", "?", "+", "-", "*", "/", "%", "&", "|",
    "^", "!", "~", "=", "<", ">",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokError {
    #[error("unterminated string literal starting at byte {offset}")]
    UnterminatedString { offset: usize },
    #[error("unterminated character literal starting at byte {offset}")]
    UnterminatedChar { offset: usize },
    #[error("unterminated comment starting at byte {offset}")]
    UnterminatedComment { offset: usize },
    #[error("unexpected character {ch:?} at byte {offset}")]
    UnexpectedCharacter { ch: char, offset: usize },
}

impl TokError {
    /// Byte offset the error points at.
    pub fn offset(&self) -> usize {
        match self {
            TokError::UnterminatedString { offset }
            | TokError::UnterminatedChar { offset }
            | TokError::UnterminatedComment { offset }
            | TokError::UnexpectedCharacter { offset, .. } => *offset,
        }
    }
}

pub fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(&text)
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn is_inline_whitespace(c: char) -> bool {
    c != '\n' && c != '\r' && c.is_whitespace()
}

/// Tokenize `text` into tokens with attached trivia, ending with an
/// end-of-file token.
pub fn tokenize(text: &str) -> Result<Vec<Token>, TokError> {
    let mut state = TokState::new(text);
    let mut tokens = Vec::new();
    loop {
        let leading = state.leading_trivia()?;
        if state.at_end() {
            tokens.push(Token {
                kind: TokenKind::EndOfFile,
                text: String::new(),
                leading,
                trailing: Vec::new(),
            });
            return Ok(tokens);
        }
        let (kind, start) = state.next_token()?;
        let text = state.text[start..state.pos].to_string();
        let trailing = state.trailing_trivia()?;
        tokens.push(Token {
            kind,
            text,
            leading,
            trailing,
        });
    }
}

/// Cursor over the source text.
pub(crate) struct TokState<'a> {
    text: &'a str,
    pos: usize,
    /// Only whitespace seen since the last line break.
    at_line_start: bool,
}

impl<'a> TokState<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        TokState {
            text,
            pos: 0,
            at_line_start: true,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn bump_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn line_end(&self) -> usize {
        match memchr2(b'\n', b'\r', self.rest().as_bytes()) {
            Some(i) => self.pos + i,
            None => self.text.len(),
        }
    }

    // ------------------------------------------------------------------
    // Trivia
    // ------------------------------------------------------------------

    fn leading_trivia(&mut self) -> Result<Vec<Trivia>, TokError> {
        let mut trivia = Vec::new();
        if self.pos == 0 && self.text.starts_with('\u{feff}') {
            self.pos = '\u{feff}'.len_utf8();
            trivia.push(Trivia::new(TriviaKind::ByteOrderMark, "\u{feff}"));
        }
        while let Some(atom) = self.trivia_atom(true)? {
            trivia.push(atom);
        }
        Ok(trivia)
    }

    fn trailing_trivia(&mut self) -> Result<Vec<Trivia>, TokError> {
        let mut trivia = Vec::new();
        while let Some(atom) = self.trivia_atom(false)? {
            let done = atom.kind == TriviaKind::EndOfLine;
            trivia.push(atom);
            if done {
                break;
            }
        }
        Ok(trivia)
    }

    fn trivia_atom(&mut self, allow_directive: bool) -> Result<Option<Trivia>, TokError> {
        let start = self.pos;
        let rest = self.rest();
        let Some(c) = self.peek() else {
            return Ok(None);
        };

        let kind = match c {
            '\r' => {
                self.pos += if rest.starts_with("\r\n") { 2 } else { 1 };
                self.at_line_start = true;
                TriviaKind::EndOfLine
            }
            '\n' => {
                self.pos += 1;
                self.at_line_start = true;
                TriviaKind::EndOfLine
            }
            c if is_inline_whitespace(c) => {
                self.bump_while(is_inline_whitespace);
                TriviaKind::Whitespace
            }
            '/' if rest.starts_with("//") => {
                self.pos = self.line_end();
                self.at_line_start = false;
                TriviaKind::SingleLineComment
            }
            '/' if rest.starts_with("/*") => {
                match memmem::find(&rest.as_bytes()[2..], b"*/") {
                    Some(i) => self.pos += 2 + i + 2,
                    None => return Err(TokError::UnterminatedComment { offset: start }),
                }
                self.at_line_start = false;
                TriviaKind::MultiLineComment
            }
            '#' if allow_directive && self.at_line_start => {
                self.pos = self.line_end();
                self.at_line_start = false;
                TriviaKind::Directive
            }
            _ => return Ok(None),
        };

        Ok(Some(Trivia::new(kind, &self.text[start..self.pos])))
    }

    // ------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------

    /// Scan one token; returns its kind and start offset.
    fn next_token(&mut self) -> Result<(TokenKind, usize), TokError> {
        let start = self.pos;
        self.at_line_start = false;
        let c = self.peek().ok_or(TokError::UnexpectedCharacter {
            ch: '\0',
            offset: start,
        })?;

        let kind = match c {
            '"' if self.rest().starts_with("\"\"\"") => {
                self.raw_string(start)?;
                TokenKind::StringLiteral
            }
            '"' => {
                self.pos += 1;
                self.regular_string(start)?;
                TokenKind::StringLiteral
            }
            '@' => match self.peek_nth(1) {
                Some('"') => {
                    self.pos += 2;
                    self.verbatim_string(start)?;
                    TokenKind::StringLiteral
                }
                Some('$') if self.peek_nth(2) == Some('"') => {
                    self.pos += 3;
                    self.interpolated_string(start, true)?;
                    TokenKind::StringLiteral
                }
                Some(n) if is_ident_start(n) => {
                    self.pos += 1;
                    self.bump_while(is_ident_continue);
                    TokenKind::Identifier
                }
                _ => return Err(TokError::UnexpectedCharacter { ch: c, offset: start }),
            },
            '$' => {
                let dollars = self.rest().chars().take_while(|&d| d == '$').count();
                let after = &self.rest()[dollars..];
                if after.starts_with("\"\"\"") {
                    self.raw_string(start)?;
                } else if dollars == 1 && after.starts_with("@\"") {
                    self.pos += 3;
                    self.interpolated_string(start, true)?;
                } else if dollars == 1 && after.starts_with('"') {
                    self.pos += 2;
                    self.interpolated_string(start, false)?;
                } else {
                    return Err(TokError::UnexpectedCharacter { ch: c, offset: start });
                }
                TokenKind::StringLiteral
            }
            '\'' => {
                self.pos += 1;
                self.char_literal(start)?;
                TokenKind::CharLiteral
            }
            c if c.is_ascii_digit() => {
                self.number();
                TokenKind::NumericLiteral
            }
            '.' if self.peek_nth(1).is_some_and(|n| n.is_ascii_digit()) => {
                self.number();
                TokenKind::NumericLiteral
            }
            c if is_ident_start(c) => {
                self.bump_while(is_ident_continue);
                if is_keyword(&self.text[start..self.pos]) {
                    TokenKind::Keyword
                } else {
                    TokenKind::Identifier
                }
            }
            _ => {
                let rest = self.rest();
                match PUNCTUATION.iter().find(|p| rest.starts_with(**p)) {
                    Some(p) => self.pos += p.len(),
                    None => return Err(TokError::UnexpectedCharacter { ch: c, offset: start }),
                }
                TokenKind::Punctuation
            }
        };

        Ok((kind, start))
    }

    /// Body of `"..."`, after the opening quote.
    fn regular_string(&mut self, start: usize) -> Result<(), TokError> {
        loop {
            match self.bump() {
                Some('"') => return Ok(()),
                Some('\\') => {
                    if self.bump().is_none() {
                        return Err(TokError::UnterminatedString { offset: start });
                    }
                }
                Some('\n') | Some('\r') | None => {
                    return Err(TokError::UnterminatedString { offset: start })
                }
                Some(_) => {}
            }
        }
    }

    /// Body of `@"..."`, after the opening quote.
    fn verbatim_string(&mut self, start: usize) -> Result<(), TokError> {
        loop {
            match self.bump() {
                Some('"') => {
                    if self.peek() == Some('"') {
                        self.pos += 1;
                    } else {
                        return Ok(());
                    }
                }
                Some(_) => {}
                None => return Err(TokError::UnterminatedString { offset: start }),
            }
        }
    }

    /// Body of `$"..."` or `$@"..."`, after the opening quote.
    fn interpolated_string(&mut self, start: usize, verbatim: bool) -> Result<(), TokError> {
        loop {
            match self.bump() {
                Some('"') => {
                    if verbatim && self.peek() == Some('"') {
                        self.pos += 1;
                    } else {
                        return Ok(());
                    }
                }
                Some('\\') if !verbatim => {
                    if self.bump().is_none() {
                        return Err(TokError::UnterminatedString { offset: start });
                    }
                }
                Some('\n') | Some('\r') if !verbatim => {
                    return Err(TokError::UnterminatedString { offset: start })
                }
                Some('{') => {
                    if self.peek() == Some('{') {
                        self.pos += 1;
                    } else {
                        self.interpolation_hole(start)?;
                    }
                }
                Some(_) => {}
                None => return Err(TokError::UnterminatedString { offset: start }),
            }
        }
    }

    /// Skip an interpolation hole up to and including its closing `}`.
    fn interpolation_hole(&mut self, start: usize) -> Result<(), TokError> {
        let mut depth = 0usize;
        loop {
            let Some(c) = self.peek() else {
                return Err(TokError::UnterminatedString { offset: start });
            };
            match c {
                '"' | '\'' => {
                    self.next_token()?;
                }
                '@' | '$' if matches!(self.peek_nth(1), Some('"') | Some('$') | Some('@')) => {
                    self.next_token()?;
                }
                '(' | '[' | '{' => {
                    depth += 1;
                    self.pos += 1;
                }
                ')' | ']' => {
                    depth = depth.saturating_sub(1);
                    self.pos += 1;
                }
                '}' => {
                    self.pos += 1;
                    if depth == 0 {
                        return Ok(());
                    }
                    depth -= 1;
                }
                ':' if self.peek_nth(1) == Some(':') => self.pos += 2,
                ':' if depth == 0 => {
                    // Format specifier runs to the closing brace.
                    match self.rest().find('}') {
                        Some(i) => self.pos += i + 1,
                        None => return Err(TokError::UnterminatedString { offset: start }),
                    }
                    return Ok(());
                }
                _ => self.pos += c.len_utf8(),
            }
        }
    }

    /// `"""..."""` with optional leading `$`s; the closing run has the same
    /// number of quotes as the opening one.
    fn raw_string(&mut self, start: usize) -> Result<(), TokError> {
        self.bump_while(|c| c == '$');
        let quotes = self.rest().chars().take_while(|&c| c == '"').count();
        self.pos += quotes;
        let closing = "\"".repeat(quotes);
        match memmem::find(self.rest().as_bytes(), closing.as_bytes()) {
            Some(i) => {
                self.pos += i + quotes;
                Ok(())
            }
            None => Err(TokError::UnterminatedString { offset: start }),
        }
    }

    /// Body of `'x'`, after the opening quote.
    fn char_literal(&mut self, start: usize) -> Result<(), TokError> {
        loop {
            match self.bump() {
                Some('\'') => return Ok(()),
                Some('\\') => {
                    if self.bump().is_none() {
                        return Err(TokError::UnterminatedChar { offset: start });
                    }
                }
                Some('\n') | Some('\r') | None => {
                    return Err(TokError::UnterminatedChar { offset: start })
                }
                Some(_) => {}
            }
        }
    }

    fn number(&mut self) {
        let rest = self.rest();
        if rest.starts_with("0x") || rest.starts_with("0X") || rest.starts_with("0b") || rest.starts_with("0B") {
            self.pos += 2;
            self.bump_while(|c| c.is_ascii_hexdigit() || c == '_');
            self.bump_while(|c| c.is_ascii_alphabetic());
            return;
        }

        self.bump_while(|c| c.is_ascii_digit() || c == '_');
        if self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
            self.bump_while(|c| c.is_ascii_digit() || c == '_');
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            let sign = matches!(self.peek_nth(1), Some('+') | Some('-'));
            let digit_at = if sign { 2 } else { 1 };
            if self.peek_nth(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                self.pos += digit_at;
                self.bump_while(|c| c.is_ascii_digit() || c == '_');
            }
        }
        self.bump_while(|c| c.is_ascii_alphabetic());
    }
}
