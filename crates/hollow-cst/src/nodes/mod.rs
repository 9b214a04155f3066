// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Syntax tree node types.

pub mod codegen;
pub mod declaration;
pub mod statement;
pub mod tree;
pub mod trivia;

pub use codegen::{Codegen, CodegenState};
pub use declaration::{
    DeclKind, Declaration, DeclarationParts, MethodDeclaration, MethodLike, OperatorDeclaration,
    SignatureDeclaration,
};
pub use statement::{ArrowBody, Block, Body, Expression, ReturnStatement, Statement, TypeSyntax};
pub use tree::{DeclId, DeclInfo, Element, Tree, TypeId, TypeInfo, TypeKind, TypeTable};
pub use trivia::{move_trivia, Token, TokenKind, Trivia, TriviaKind, TriviaSide};
