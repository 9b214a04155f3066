// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Bodies, statements, expressions and types.
//!
//! Only the statement shapes the rewrite engine inspects are modelled
//! structurally. Everything else is kept as an opaque run of tokens.

use super::trivia::Token;

/// A type as written, e.g. `int`, `List<string>`, `(int, bool)?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSyntax {
    pub tokens: Vec<Token>,
}

impl TypeSyntax {
    pub fn new(tokens: Vec<Token>) -> Self {
        TypeSyntax { tokens }
    }

    pub fn first_token(&self) -> Option<&Token> {
        self.tokens.first()
    }

    /// A copy with the first token replaced.
    pub fn with_first_token(&self, token: Token) -> Self {
        let mut tokens = self.tokens.clone();
        if let Some(first) = tokens.first_mut() {
            *first = token;
        }
        TypeSyntax { tokens }
    }

    /// True for exactly the single keyword `void`.
    pub fn is_void(&self) -> bool {
        matches!(self.tokens.as_slice(), [only] if only.is("void"))
    }
}

/// An expression kept as tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub tokens: Vec<Token>,
}

impl Expression {
    pub fn new(tokens: Vec<Token>) -> Self {
        Expression { tokens }
    }

    /// The expression's own rendering: token text joined with the trivia
    /// between tokens, without the outer leading and trailing trivia.
    pub fn text(&self) -> String {
        let mut out = String::new();
        let last = self.tokens.len().saturating_sub(1);
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                for trivia in &token.leading {
                    out.push_str(&trivia.text);
                }
            }
            out.push_str(&token.text);
            if i < last {
                for trivia in &token.trailing {
                    out.push_str(&trivia.text);
                }
            }
        }
        out
    }
}

/// `{ statements }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub open: Token,
    pub statements: Vec<Statement>,
    pub close: Token,
}

/// `return expr;` or `return;`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnStatement {
    pub keyword: Token,
    pub expression: Option<Expression>,
    pub semicolon: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Block(Block),
    /// A lone `;`.
    Empty(Token),
    Return(ReturnStatement),
    /// Any other statement, control statements included, as tokens.
    Other(Vec<Token>),
}

impl Statement {
    /// Flatten into tokens in source order.
    pub fn into_tokens(self) -> Vec<Token> {
        match self {
            Statement::Block(block) => {
                let mut tokens = vec![block.open];
                for statement in block.statements {
                    tokens.extend(statement.into_tokens());
                }
                tokens.push(block.close);
                tokens
            }
            Statement::Empty(token) => vec![token],
            Statement::Return(ret) => {
                let mut tokens = vec![ret.keyword];
                if let Some(expression) = ret.expression {
                    tokens.extend(expression.tokens);
                }
                tokens.push(ret.semicolon);
                tokens
            }
            Statement::Other(tokens) => tokens,
        }
    }
}

/// `=> expression` of an expression-bodied member. The `;` is the member's
/// terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrowBody {
    pub arrow: Token,
    pub expression: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Block(Block),
    Arrow(ArrowBody),
}

impl Body {
    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Body::Block(block) => Some(block),
            Body::Arrow(_) => None,
        }
    }
}
