// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Method-like member declarations.
//!
//! Every declaration has the same layout in source order:
//!
//! ```text
//! attributes  modifiers  [return type]  signature  (body [terminator] | terminator)
//! ```
//!
//! A block body has no terminator. An arrow body (`=> expr`) and a missing
//! body both end with a `;` terminator.
//!
//! Methods and operators are the two rewritable kinds and share the
//! [`MethodLike`] capability. Constructors, destructors and conversion
//! operators are kept so the tree round-trips, but nothing rewrites them.

use std::fmt;

use super::statement::{Body, TypeSyntax};
use super::trivia::Token;

/// The parts of a method-like declaration, owned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationParts {
    /// Attribute lists such as `[Obsolete]`, as tokens.
    pub attributes: Vec<Token>,
    pub modifiers: Vec<Token>,
    pub return_type: TypeSyntax,
    /// Everything between the return type and the body.
    pub signature: Vec<Token>,
    pub body: Option<Body>,
    pub terminator: Option<Token>,
}

/// Capability shared by the rewritable declaration kinds.
///
/// Rewrites are written once against this trait; each kind only decides how
/// to build itself back from [`DeclarationParts`].
pub trait MethodLike {
    fn modifiers(&self) -> &[Token];
    fn return_type(&self) -> &TypeSyntax;
    fn signature(&self) -> &[Token];
    fn body(&self) -> Option<&Body>;
    fn terminator(&self) -> Option<&Token>;

    fn has_modifier(&self, keyword: &str) -> bool {
        self.modifiers().iter().any(|m| m.is(keyword))
    }

    fn to_parts(&self) -> DeclarationParts;

    fn from_parts(parts: DeclarationParts) -> Self
    where
        Self: Sized;
}

/// `int Foo(int x) { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDeclaration {
    pub attributes: Vec<Token>,
    pub modifiers: Vec<Token>,
    pub return_type: TypeSyntax,
    /// Name, type parameters, parameter list and constraints.
    pub signature: Vec<Token>,
    pub body: Option<Body>,
    pub terminator: Option<Token>,
}

/// `public static Money operator +(Money a, Money b) { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorDeclaration {
    pub attributes: Vec<Token>,
    pub modifiers: Vec<Token>,
    pub return_type: TypeSyntax,
    /// `operator`, the operator token(s) and the parameter list.
    pub signature: Vec<Token>,
    pub body: Option<Body>,
    pub terminator: Option<Token>,
}

macro_rules! impl_method_like {
    ($ty:ident) => {
        impl MethodLike for $ty {
            fn modifiers(&self) -> &[Token] {
                &self.modifiers
            }

            fn return_type(&self) -> &TypeSyntax {
                &self.return_type
            }

            fn signature(&self) -> &[Token] {
                &self.signature
            }

            fn body(&self) -> Option<&Body> {
                self.body.as_ref()
            }

            fn terminator(&self) -> Option<&Token> {
                self.terminator.as_ref()
            }

            fn to_parts(&self) -> DeclarationParts {
                DeclarationParts {
                    attributes: self.attributes.clone(),
                    modifiers: self.modifiers.clone(),
                    return_type: self.return_type.clone(),
                    signature: self.signature.clone(),
                    body: self.body.clone(),
                    terminator: self.terminator.clone(),
                }
            }

            fn from_parts(parts: DeclarationParts) -> Self {
                $ty {
                    attributes: parts.attributes,
                    modifiers: parts.modifiers,
                    return_type: parts.return_type,
                    signature: parts.signature,
                    body: parts.body,
                    terminator: parts.terminator,
                }
            }
        }
    };
}

impl_method_like!(MethodDeclaration);
impl_method_like!(OperatorDeclaration);

/// A method-like member without a return type: constructors, destructors
/// and conversion operators (whose target type is part of the signature).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureDeclaration {
    pub attributes: Vec<Token>,
    pub modifiers: Vec<Token>,
    pub signature: Vec<Token>,
    pub body: Option<Body>,
    pub terminator: Option<Token>,
}

/// Kind tag for a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Method,
    Operator,
    Constructor,
    Destructor,
    ConversionOperator,
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeclKind::Method => "method",
            DeclKind::Operator => "operator",
            DeclKind::Constructor => "constructor",
            DeclKind::Destructor => "destructor",
            DeclKind::ConversionOperator => "conversion operator",
        };
        f.write_str(name)
    }
}

/// A method-like member of any kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Method(MethodDeclaration),
    Operator(OperatorDeclaration),
    Constructor(SignatureDeclaration),
    Destructor(SignatureDeclaration),
    ConversionOperator(SignatureDeclaration),
}

impl Declaration {
    pub fn kind(&self) -> DeclKind {
        match self {
            Declaration::Method(_) => DeclKind::Method,
            Declaration::Operator(_) => DeclKind::Operator,
            Declaration::Constructor(_) => DeclKind::Constructor,
            Declaration::Destructor(_) => DeclKind::Destructor,
            Declaration::ConversionOperator(_) => DeclKind::ConversionOperator,
        }
    }

    /// The rewritable view of this declaration, if it has one.
    pub fn as_method_like(&self) -> Option<&dyn MethodLike> {
        match self {
            Declaration::Method(m) => Some(m),
            Declaration::Operator(o) => Some(o),
            Declaration::Constructor(_)
            | Declaration::Destructor(_)
            | Declaration::ConversionOperator(_) => None,
        }
    }

    pub fn body(&self) -> Option<&Body> {
        match self {
            Declaration::Method(m) => m.body.as_ref(),
            Declaration::Operator(o) => o.body.as_ref(),
            Declaration::Constructor(s)
            | Declaration::Destructor(s)
            | Declaration::ConversionOperator(s) => s.body.as_ref(),
        }
    }
}
