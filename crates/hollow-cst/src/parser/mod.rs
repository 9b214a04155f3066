// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Structural C# parser.
//!
//! This is not a full C# grammar. It recognizes just enough structure to find
//! method-like members and look inside their bodies:
//!
//! - type declarations (`class`, `struct`, `interface`, `record`, `enum`) and
//!   their nesting
//! - members of those types: attribute lists, modifiers, then a header that
//!   ends at `{`, `=>`, `;` or `=` outside brackets
//! - method-like members (a header with a parameter list) become arena
//!   entries; fields, properties, indexers, events and delegates stay tokens
//! - bodies split into statements
//!
//! Delimiters are checked for balance everywhere, so malformed input is
//! rejected rather than silently mis-structured.

mod errors;

pub use errors::{ParserError, Result};

use hollow_core::patch::Span;

use crate::nodes::declaration::{
    DeclKind, Declaration, MethodDeclaration, OperatorDeclaration, SignatureDeclaration,
};
use crate::nodes::statement::{
    ArrowBody, Block, Body, Expression, ReturnStatement, Statement, TypeSyntax,
};
use crate::nodes::tree::{DeclId, DeclInfo, Element, Tree, TypeId, TypeKind, TypeTable};
use crate::nodes::trivia::{Token, TokenKind};

/// Member modifiers, including contextual ones.
const MODIFIERS: &[&str] = &[
    "abstract", "async", "const", "extern", "file", "fixed", "internal", "new", "override",
    "partial", "private", "protected", "public", "readonly", "required", "sealed", "static",
    "unsafe", "virtual", "volatile",
];

/// Keywords after which a brace group continues the current expression.
const CONTINUING_KEYWORDS: &[&str] = &["as", "is", "switch", "with", "and", "or"];

fn is_modifier(token: &Token) -> bool {
    token.is_word() && MODIFIERS.contains(&token.text.as_str())
}

fn is_open(token: &Token) -> bool {
    token.kind == TokenKind::Punctuation && matches!(token.text.as_str(), "(" | "[" | "{")
}

fn is_close(token: &Token) -> bool {
    token.kind == TokenKind::Punctuation && matches!(token.text.as_str(), ")" | "]" | "}")
}

fn closer_for(open: &str) -> &'static str {
    match open {
        "(" => ")",
        "[" => "]",
        _ => "}",
    }
}

/// `>`, `>>` or `>>>`: how many angle brackets the token closes.
fn closing_angles(token: &Token) -> usize {
    let all_angles = !token.text.is_empty() && token.text.bytes().all(|b| b == b'>');
    if token.kind == TokenKind::Punctuation && all_angles {
        token.text.len()
    } else {
        0
    }
}

fn describe(token: &Token) -> String {
    if token.is_eof() {
        "end of file".to_string()
    } else {
        format!("'{}'", token.text)
    }
}

fn joined(tokens: &[Token], separator: &str) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Where the pieces of a method-like header are.
struct Layout {
    kind: DeclKind,
    /// First token after the return type (or of the header, if none).
    name_start: usize,
    name: String,
}

/// Parse a token stream (ending with end-of-file) into a [`Tree`].
pub fn parse_tokens(tokens: Vec<Token>) -> Result<Tree> {
    let mut parser = Parser::new(tokens);
    parser.scope(None, None)?;
    parser.emit(parser.pos);
    Ok(Tree::new(
        parser.elements,
        parser.decls,
        parser.infos,
        parser.types,
    ))
}

struct Parser {
    tokens: Vec<Token>,
    /// Offset of each token's leading trivia; one extra entry for the end.
    offsets: Vec<usize>,
    pos: usize,
    elements: Vec<Element>,
    decls: Vec<Declaration>,
    infos: Vec<DeclInfo>,
    types: TypeTable,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        let mut offsets = Vec::with_capacity(tokens.len() + 1);
        let mut offset = 0;
        for token in &tokens {
            offsets.push(offset);
            offset += token.full_len();
        }
        offsets.push(offset);

        Parser {
            tokens,
            offsets,
            pos: 0,
            elements: Vec::new(),
            decls: Vec::new(),
            infos: Vec::new(),
            types: TypeTable::default(),
        }
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn text_start(&self, i: usize) -> usize {
        self.offsets[i] + self.tokens[i].leading_len()
    }

    fn text_end(&self, i: usize) -> usize {
        self.text_start(i) + self.tokens[i].text.len()
    }

    fn emit(&mut self, i: usize) {
        self.elements.push(Element::Token(self.tokens[i].clone()));
    }

    fn emit_range(&mut self, from: usize, to: usize) {
        for i in from..to {
            self.emit(i);
        }
    }

    fn unclosed(&self, open: usize) -> ParserError {
        ParserError::UnclosedDelimiter {
            delimiter: self.tokens[open].text.clone(),
            offset: self.text_start(open),
        }
    }

    fn unexpected(&self, i: usize, expected: &str) -> ParserError {
        ParserError::UnexpectedToken {
            found: describe(&self.tokens[i]),
            expected: expected.to_string(),
            offset: self.text_start(i),
        }
    }

    fn expect(&self, i: usize, text: &str) -> Result<()> {
        if self.tokens[i].is_punct(text) {
            Ok(())
        } else {
            Err(self.unexpected(i, &format!("'{}'", text)))
        }
    }

    /// Index of the bracket closing the one at `open`.
    fn matching_close(&self, open: usize) -> Result<usize> {
        let mut stack = vec![open];
        let mut i = open + 1;
        loop {
            let token = &self.tokens[i];
            if token.is_eof() {
                return Err(self.unclosed(stack.last().copied().unwrap_or(open)));
            }
            if is_open(token) {
                stack.push(i);
            } else if is_close(token) {
                let top = stack.pop().unwrap_or(open);
                let expected = closer_for(&self.tokens[top].text);
                if token.text != expected {
                    return Err(self.unexpected(i, &format!("'{}'", expected)));
                }
                if stack.is_empty() {
                    return Ok(i);
                }
            }
            i += 1;
        }
    }

    /// First index at or after `from` holding one of `stops` outside any
    /// bracket.
    fn find_stop(&self, from: usize, stops: &[&str]) -> Result<usize> {
        let mut stack: Vec<usize> = Vec::new();
        let mut i = from;
        loop {
            let token = &self.tokens[i];
            if token.is_eof() {
                return Err(match stack.last() {
                    Some(&open) => self.unclosed(open),
                    None => self.unexpected(i, &stops.join(" or ")),
                });
            }
            if stack.is_empty()
                && token.kind == TokenKind::Punctuation
                && stops.contains(&token.text.as_str())
            {
                return Ok(i);
            }
            if is_open(token) {
                stack.push(i);
            } else if is_close(token) {
                match stack.pop() {
                    Some(open) => {
                        let expected = closer_for(&self.tokens[open].text);
                        if token.text != expected {
                            return Err(self.unexpected(i, &format!("'{}'", expected)));
                        }
                    }
                    None => return Err(self.unexpected(i, &stops.join(" or "))),
                }
            }
            i += 1;
        }
    }

    /// Index after the parenthesized group starting at `i`.
    fn after_parens(&self, i: usize) -> Result<usize> {
        self.expect(i, "(")?;
        Ok(self.matching_close(i)? + 1)
    }

    /// Index after the brace block starting at `i`.
    fn after_block(&self, i: usize) -> Result<usize> {
        self.expect(i, "{")?;
        Ok(self.matching_close(i)? + 1)
    }

    /// Walk back from a `>`-ending token to just before its `<`.
    fn skip_type_args_back(&self, mut j: usize, floor: usize) -> Option<usize> {
        let mut depth = 0usize;
        loop {
            let token = &self.tokens[j];
            depth += closing_angles(token);
            if token.is_punct("<") {
                depth = depth.checked_sub(1)?;
            } else if token.is_punct("<<") {
                depth = depth.checked_sub(2)?;
            }
            if depth == 0 {
                return if j > floor { Some(j - 1) } else { None };
            }
            if j <= floor {
                return None;
            }
            j -= 1;
        }
    }

    /// Extend a name at `j` back over `Qualifier.` and `Qualifier<T>.` prefixes.
    fn qualified_start(&self, j: usize, floor: usize) -> usize {
        let mut start = j;
        while start >= floor + 2
            && (self.tokens[start - 1].is_punct(".") || self.tokens[start - 1].is_punct("::"))
        {
            let mut q = start - 2;
            if closing_angles(&self.tokens[q]) > 0 {
                match self.skip_type_args_back(q, floor) {
                    Some(before) => q = before,
                    None => break,
                }
            }
            if self.tokens[q].kind != TokenKind::Identifier {
                break;
            }
            start = q;
        }
        start
    }

    // ------------------------------------------------------------------
    // Scopes and types
    // ------------------------------------------------------------------

    /// Parse until end of file (`open` is `None`) or until the `}` matching
    /// `open`, which is left unconsumed.
    fn scope(&mut self, container: Option<TypeId>, open: Option<usize>) -> Result<()> {
        loop {
            let token = &self.tokens[self.pos];
            if token.is_eof() {
                return match open {
                    Some(o) => Err(self.unclosed(o)),
                    None => Ok(()),
                };
            }
            if token.is_punct("}") {
                return match open {
                    Some(_) => Ok(()),
                    None => Err(self.unexpected(self.pos, "a declaration")),
                };
            }

            if let Some(keyword) = self.type_keyword_at(self.pos) {
                self.type_declaration(keyword, container)?;
            } else if let Some(container) = container {
                self.member(container)?;
            } else if token.is_punct("{") {
                let brace = self.pos;
                self.emit(brace);
                self.pos += 1;
                self.scope(None, Some(brace))?;
                self.emit(self.pos);
                self.pos += 1;
            } else if is_open(token) {
                // Top-level statements only need to balance.
                let end = self.matching_close(self.pos)? + 1;
                self.emit_range(self.pos, end);
                self.pos = end;
            } else if is_close(token) {
                return Err(self.unexpected(self.pos, "a declaration"));
            } else {
                self.emit(self.pos);
                self.pos += 1;
            }
        }
    }

    /// If a type declaration starts at `i`, the index of its keyword.
    fn type_keyword_at(&self, i: usize) -> Option<usize> {
        let mut j = i;
        loop {
            let token = &self.tokens[j];
            if token.is_punct("[") {
                j = self.matching_close(j).ok()? + 1;
            } else if is_modifier(token) || token.is("ref") {
                j += 1;
            } else {
                break;
            }
        }

        let token = &self.tokens[j];
        match token.text.as_str() {
            "class" | "struct" | "interface" | "enum" if token.kind == TokenKind::Keyword => Some(j),
            "record" if token.kind == TokenKind::Identifier => {
                let next = &self.tokens[j + 1];
                let starts_type = next.kind == TokenKind::Identifier
                    || next.is("class")
                    || next.is("struct");
                starts_type.then_some(j)
            }
            _ => None,
        }
    }

    fn type_declaration(&mut self, keyword: usize, container: Option<TypeId>) -> Result<()> {
        let (kind, name_at) = match self.tokens[keyword].text.as_str() {
            "class" => (TypeKind::Class, keyword + 1),
            "struct" => (TypeKind::Struct, keyword + 1),
            "interface" => (TypeKind::Interface, keyword + 1),
            "enum" => (TypeKind::Enum, keyword + 1),
            _ if self.tokens[keyword + 1].is("struct") => (TypeKind::RecordStruct, keyword + 2),
            _ if self.tokens[keyword + 1].is("class") => (TypeKind::Record, keyword + 2),
            _ => (TypeKind::Record, keyword + 1),
        };
        let name = match self.tokens.get(name_at) {
            Some(t) if t.kind == TokenKind::Identifier => t.text.clone(),
            _ => String::new(),
        };

        let stop = self.find_stop(keyword + 1, &["{", ";"])?;
        self.emit_range(self.pos, stop + 1);
        let id = self.types.push(kind, name, container);
        self.pos = stop + 1;
        if self.tokens[stop].is_punct(";") {
            return Ok(());
        }

        if kind == TypeKind::Enum {
            let close = self.matching_close(stop)?;
            self.emit_range(stop + 1, close);
            self.pos = close;
        } else {
            self.scope(Some(id), Some(stop))?;
        }
        self.emit(self.pos);
        self.pos += 1;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Members
    // ------------------------------------------------------------------

    fn member(&mut self, container: TypeId) -> Result<()> {
        let start = self.pos;
        let mut i = start;
        while self.tokens[i].is_punct("[") {
            i = self.matching_close(i)? + 1;
        }
        let attributes_end = i;
        while is_modifier(&self.tokens[i]) {
            i += 1;
        }
        let header = i;

        let stop = self.find_stop(header, &["{", "=>", ";", "="])?;
        let method_like = !self.tokens[header].is("delegate")
            && !self.tokens[header].is("event")
            && !self.tokens[stop].is_punct("=");
        let layout = if method_like {
            self.method_layout(header, stop)
        } else {
            None
        };

        match layout {
            Some(layout) => self.method_like(container, start, attributes_end, header, stop, layout),
            None => {
                let end = self.raw_member_end(stop)?;
                self.emit_range(start, end);
                self.pos = end;
                Ok(())
            }
        }
    }

    /// End of a field, property, indexer, event or delegate whose header
    /// stopped at `stop`.
    fn raw_member_end(&self, stop: usize) -> Result<usize> {
        let token = &self.tokens[stop];
        if token.is_punct(";") {
            return Ok(stop + 1);
        }
        if token.is_punct("{") {
            let after = self.matching_close(stop)? + 1;
            let next = &self.tokens[after];
            if next.is_punct("=") || next.is_punct("=>") {
                return Ok(self.find_stop(after, &[";"])? + 1);
            }
            return Ok(after);
        }
        Ok(self.find_stop(stop + 1, &[";"])? + 1)
    }

    /// Recognize a method-like header in `[header, stop)`.
    fn method_layout(&self, header: usize, stop: usize) -> Option<Layout> {
        let mut depth = 0usize;
        let mut operator = None;
        let mut parens = Vec::new();
        for (i, token) in self.tokens.iter().enumerate().take(stop).skip(header) {
            if depth == 0 && token.is("operator") && operator.is_none() {
                operator = Some(i);
            }
            if token.is_punct("(") && depth == 0 {
                parens.push(i);
            }
            if is_open(token) {
                depth += 1;
            } else if is_close(token) {
                depth = depth.saturating_sub(1);
            }
        }

        if let Some(k) = operator {
            let open = parens.into_iter().find(|&p| p >= k + 2)?;
            let conversion = k > header
                && (self.tokens[k - 1].is("implicit") || self.tokens[k - 1].is("explicit"));
            if conversion {
                return Some(Layout {
                    kind: DeclKind::ConversionOperator,
                    name_start: header,
                    name: joined(&self.tokens[k - 1..open], " "),
                });
            }
            let name_start = self.qualified_start(k, header);
            if name_start == header {
                return None;
            }
            return Some(Layout {
                kind: DeclKind::Operator,
                name_start,
                name: joined(&self.tokens[k + 1..open], " "),
            });
        }

        for open in parens {
            if open == header {
                continue;
            }
            let mut j = open - 1;
            if closing_angles(&self.tokens[j]) > 0 {
                match self.skip_type_args_back(j, header) {
                    Some(before) => j = before,
                    None => continue,
                }
            }
            if self.tokens[j].kind != TokenKind::Identifier {
                continue;
            }

            if self.tokens[header].is_punct("~") && j == header + 1 {
                return Some(Layout {
                    kind: DeclKind::Destructor,
                    name_start: header,
                    name: format!("~{}", self.tokens[j].text),
                });
            }
            let name_start = self.qualified_start(j, header);
            let kind = if name_start == header {
                DeclKind::Constructor
            } else {
                DeclKind::Method
            };
            return Some(Layout {
                kind,
                name_start,
                name: joined(&self.tokens[name_start..=j], ""),
            });
        }
        None
    }

    fn method_like(
        &mut self,
        container: TypeId,
        start: usize,
        attributes_end: usize,
        header: usize,
        stop: usize,
        layout: Layout,
    ) -> Result<()> {
        let (body, terminator, end) = match self.tokens[stop].text.as_str() {
            "{" => {
                let (block, end) = self.block(stop)?;
                (Some(Body::Block(block)), None, end)
            }
            "=>" => {
                let semi = self.find_stop(stop + 1, &[";"])?;
                let arrow = ArrowBody {
                    arrow: self.tokens[stop].clone(),
                    expression: Expression::new(self.tokens[stop + 1..semi].to_vec()),
                };
                (Some(Body::Arrow(arrow)), Some(self.tokens[semi].clone()), semi + 1)
            }
            _ => (None, Some(self.tokens[stop].clone()), stop + 1),
        };

        let attributes = self.tokens[start..attributes_end].to_vec();
        let modifiers = self.tokens[attributes_end..header].to_vec();
        let return_type = TypeSyntax::new(self.tokens[header..layout.name_start].to_vec());
        let signature = self.tokens[layout.name_start..stop].to_vec();
        let whole_signature = self.tokens[header..stop].to_vec();

        let decl = match layout.kind {
            DeclKind::Method => Declaration::Method(MethodDeclaration {
                attributes,
                modifiers,
                return_type,
                signature,
                body,
                terminator,
            }),
            DeclKind::Operator => Declaration::Operator(OperatorDeclaration {
                attributes,
                modifiers,
                return_type,
                signature,
                body,
                terminator,
            }),
            DeclKind::Constructor | DeclKind::Destructor | DeclKind::ConversionOperator => {
                let decl = SignatureDeclaration {
                    attributes,
                    modifiers,
                    signature: whole_signature,
                    body,
                    terminator,
                };
                match layout.kind {
                    DeclKind::Constructor => Declaration::Constructor(decl),
                    DeclKind::Destructor => Declaration::Destructor(decl),
                    _ => Declaration::ConversionOperator(decl),
                }
            }
        };

        let id = DeclId(self.decls.len() as u32);
        self.infos.push(DeclInfo {
            id,
            kind: layout.kind,
            name: layout.name,
            container: Some(container),
            span: Span::from_offsets(self.text_start(start), self.text_end(end - 1)),
            full_span: Span::from_offsets(self.offsets[start], self.offsets[end]),
        });
        self.decls.push(decl);
        self.elements.push(Element::Decl(id));
        self.pos = end;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    /// Parse the block opening at `open`; returns it and the index after it.
    fn block(&self, open: usize) -> Result<(Block, usize)> {
        let mut statements = Vec::new();
        let mut i = open + 1;
        loop {
            let token = &self.tokens[i];
            if token.is_eof() {
                return Err(self.unclosed(open));
            }
            if token.is_punct("}") {
                let block = Block {
                    open: self.tokens[open].clone(),
                    statements,
                    close: token.clone(),
                };
                return Ok((block, i + 1));
            }
            let (statement, next) = self.statement(i)?;
            statements.push(statement);
            i = next;
        }
    }

    fn statement(&self, i: usize) -> Result<(Statement, usize)> {
        let token = &self.tokens[i];
        if token.is_punct("{") {
            let (block, next) = self.block(i)?;
            return Ok((Statement::Block(block), next));
        }
        if token.is_punct(";") {
            return Ok((Statement::Empty(token.clone()), i + 1));
        }
        if token.is("return") && token.kind == TokenKind::Keyword {
            let semi = self.find_stop(i + 1, &[";"])?;
            let expression = (semi > i + 1).then(|| Expression::new(self.tokens[i + 1..semi].to_vec()));
            let statement = ReturnStatement {
                keyword: token.clone(),
                expression,
                semicolon: self.tokens[semi].clone(),
            };
            return Ok((Statement::Return(statement), semi + 1));
        }
        let end = self.statement_end(i)?;
        Ok((Statement::Other(self.tokens[i..end].to_vec()), end))
    }

    /// Index after the statement starting at `i`.
    fn statement_end(&self, i: usize) -> Result<usize> {
        let token = &self.tokens[i];
        if token.is_punct("{") {
            return self.after_block(i);
        }
        if token.is_punct(";") {
            return Ok(i + 1);
        }
        if token.is_eof() {
            return Err(self.unexpected(i, "a statement"));
        }

        let next = &self.tokens[i + 1];
        match token.text.as_str() {
            "if" => {
                let mut end = self.statement_end(self.after_parens(i + 1)?)?;
                if self.tokens[end].is("else") {
                    end = self.statement_end(end + 1)?;
                }
                Ok(end)
            }
            "while" | "for" | "foreach" | "lock" | "fixed" => {
                self.statement_end(self.after_parens(i + 1)?)
            }
            "using" if next.is_punct("(") => self.statement_end(self.after_parens(i + 1)?),
            "do" => {
                let end = self.statement_end(i + 1)?;
                if !self.tokens[end].is("while") {
                    return Err(self.unexpected(end, "'while'"));
                }
                let after = self.after_parens(end + 1)?;
                self.expect(after, ";")?;
                Ok(after + 1)
            }
            "try" => {
                let mut end = self.after_block(i + 1)?;
                while self.tokens[end].is("catch") {
                    end += 1;
                    if self.tokens[end].is_punct("(") {
                        end = self.after_parens(end)?;
                    }
                    if self.tokens[end].is("when") {
                        end = self.after_parens(end + 1)?;
                    }
                    end = self.after_block(end)?;
                }
                if self.tokens[end].is("finally") {
                    end = self.after_block(end + 1)?;
                }
                Ok(end)
            }
            "switch" => self.after_block(self.after_parens(i + 1)?),
            "checked" | "unchecked" | "unsafe" if next.is_punct("{") => self.after_block(i + 1),
            "await" if next.is("foreach") || next.is("using") => self.statement_end(i + 1),
            _ => self.simple_statement_end(i),
        }
    }

    /// End of an expression-like statement: after its `;`, or after a brace
    /// group (a local function body) that is not followed by more expression.
    fn simple_statement_end(&self, i: usize) -> Result<usize> {
        let mut stack: Vec<usize> = Vec::new();
        let mut j = i;
        loop {
            let token = &self.tokens[j];
            if token.is_eof() {
                return Err(match stack.last() {
                    Some(&open) => self.unclosed(open),
                    None => self.unexpected(j, "';'"),
                });
            }
            if stack.is_empty() && token.is_punct(";") {
                return Ok(j + 1);
            }
            if is_open(token) {
                stack.push(j);
            } else if is_close(token) {
                let Some(open) = stack.pop() else {
                    return Err(self.unexpected(j, "';'"));
                };
                let expected = closer_for(&self.tokens[open].text);
                if token.text != expected {
                    return Err(self.unexpected(j, &format!("'{}'", expected)));
                }
                if stack.is_empty() && token.is_punct("}") {
                    let next = &self.tokens[j + 1];
                    let continues = (next.kind == TokenKind::Punctuation && !next.is_punct("}"))
                        || CONTINUING_KEYWORDS.contains(&next.text.as_str());
                    if !continues {
                        return Ok(j + 1);
                    }
                }
            }
            j += 1;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
