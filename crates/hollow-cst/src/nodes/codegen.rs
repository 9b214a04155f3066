// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Serialization of nodes back to source text.
//!
//! Codegen writes every token with its leading and trailing trivia, so for an
//! unmodified tree the output is the parsed input, byte for byte.

use std::fmt;

use super::declaration::{
    Declaration, MethodDeclaration, OperatorDeclaration, SignatureDeclaration,
};
use super::statement::{ArrowBody, Block, Body, Expression, ReturnStatement, Statement, TypeSyntax};
use super::tree::{Element, Tree};
use super::trivia::{Token, Trivia};

/// Accumulates generated source.
#[derive(Debug, Default)]
pub struct CodegenState {
    out: String,
}

impl CodegenState {
    pub fn add_token(&mut self, text: &str) {
        self.out.push_str(text);
    }

    pub fn add_trivia(&mut self, trivia: &[Trivia]) {
        for t in trivia {
            self.out.push_str(&t.text);
        }
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

impl fmt::Display for CodegenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.out)
    }
}

pub trait Codegen {
    fn codegen(&self, state: &mut CodegenState);

    /// Generate source for this node alone.
    fn to_source(&self) -> String {
        let mut state = CodegenState::default();
        self.codegen(&mut state);
        state.into_string()
    }
}

impl Codegen for Token {
    fn codegen(&self, state: &mut CodegenState) {
        state.add_trivia(&self.leading);
        state.add_token(&self.text);
        state.add_trivia(&self.trailing);
    }
}

impl<T: Codegen> Codegen for [T] {
    fn codegen(&self, state: &mut CodegenState) {
        for item in self {
            item.codegen(state);
        }
    }
}

impl<T: Codegen> Codegen for Option<T> {
    fn codegen(&self, state: &mut CodegenState) {
        if let Some(item) = self {
            item.codegen(state);
        }
    }
}

impl Codegen for TypeSyntax {
    fn codegen(&self, state: &mut CodegenState) {
        self.tokens.codegen(state);
    }
}

impl Codegen for Expression {
    fn codegen(&self, state: &mut CodegenState) {
        self.tokens.codegen(state);
    }
}

impl Codegen for Block {
    fn codegen(&self, state: &mut CodegenState) {
        self.open.codegen(state);
        self.statements.codegen(state);
        self.close.codegen(state);
    }
}

impl Codegen for ReturnStatement {
    fn codegen(&self, state: &mut CodegenState) {
        self.keyword.codegen(state);
        self.expression.codegen(state);
        self.semicolon.codegen(state);
    }
}

impl Codegen for Statement {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            Statement::Block(block) => block.codegen(state),
            Statement::Empty(token) => token.codegen(state),
            Statement::Return(ret) => ret.codegen(state),
            Statement::Other(tokens) => tokens.codegen(state),
        }
    }
}

impl Codegen for ArrowBody {
    fn codegen(&self, state: &mut CodegenState) {
        self.arrow.codegen(state);
        self.expression.codegen(state);
    }
}

impl Codegen for Body {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            Body::Block(block) => block.codegen(state),
            Body::Arrow(arrow) => arrow.codegen(state),
        }
    }
}

impl Codegen for MethodDeclaration {
    fn codegen(&self, state: &mut CodegenState) {
        self.attributes.codegen(state);
        self.modifiers.codegen(state);
        self.return_type.codegen(state);
        self.signature.codegen(state);
        self.body.codegen(state);
        self.terminator.codegen(state);
    }
}

impl Codegen for OperatorDeclaration {
    fn codegen(&self, state: &mut CodegenState) {
        self.attributes.codegen(state);
        self.modifiers.codegen(state);
        self.return_type.codegen(state);
        self.signature.codegen(state);
        self.body.codegen(state);
        self.terminator.codegen(state);
    }
}

impl Codegen for SignatureDeclaration {
    fn codegen(&self, state: &mut CodegenState) {
        self.attributes.codegen(state);
        self.modifiers.codegen(state);
        self.signature.codegen(state);
        self.body.codegen(state);
        self.terminator.codegen(state);
    }
}

impl Codegen for Declaration {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            Declaration::Method(m) => m.codegen(state),
            Declaration::Operator(o) => o.codegen(state),
            Declaration::Constructor(s)
            | Declaration::Destructor(s)
            | Declaration::ConversionOperator(s) => s.codegen(state),
        }
    }
}

impl Codegen for Tree {
    fn codegen(&self, state: &mut CodegenState) {
        for element in self.elements() {
            match element {
                Element::Token(token) => token.codegen(state),
                Element::Decl(id) => self.decl(*id).codegen(state),
            }
        }
    }
}

impl<T: Codegen + ?Sized> Codegen for &T {
    fn codegen(&self, state: &mut CodegenState) {
        (**self).codegen(state);
    }
}
