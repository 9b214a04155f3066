// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The parsed file.
//!
//! # Layout
//!
//! A [`Tree`] is a flat sequence of [`Element`]s in source order. Most
//! elements are plain tokens; each method-like member is a single
//! [`Element::Decl`] that refers into the declaration arena by [`DeclId`].
//!
//! ```text
//! Given code:
//!   class C { void A() { } int B() => 1; }
//! Elements:
//!   Token(class) Token(C) Token({) Decl(0) Decl(1) Token(}) Token(EOF)
//! Arena:
//!   DeclId(0) -> Method A
//!   DeclId(1) -> Method B
//! ```
//!
//! DeclIds are assigned in source order at parse time and stay valid for
//! every tree derived from the parsed one.
//!
//! # Sharing
//!
//! Elements, the side tables and each arena entry sit behind [`Arc`], so a
//! rewritten tree shares everything it did not replace with its origin. The
//! origin stays valid and unchanged.
//!
//! # Side tables
//!
//! [`DeclInfo`] and [`TypeInfo`] describe positions in the source the tree was
//! parsed from. They are carried unchanged into rewritten trees, so their
//! spans always refer to the original text.

use std::fmt;
use std::sync::Arc;

use hollow_core::patch::Span;

use super::declaration::{DeclKind, Declaration};
use super::trivia::Token;

/// Handle of a declaration in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

impl DeclId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeclId({})", self.0)
    }
}

/// Handle of a type declaration in the [`TypeTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Token(Token),
    Decl(DeclId),
}

/// Kind of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Record,
    RecordStruct,
    Enum,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    pub id: TypeId,
    pub kind: TypeKind,
    pub name: String,
    pub parent: Option<TypeId>,
}

/// All type declarations of a file, outer types before inner ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeTable {
    types: Vec<TypeInfo>,
}

impl TypeTable {
    pub(crate) fn push(&mut self, kind: TypeKind, name: String, parent: Option<TypeId>) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(TypeInfo {
            id,
            kind,
            name,
            parent,
        });
        id
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeInfo> {
        self.types.get(id.0 as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeInfo> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The closest class enclosing `id`, `id` itself included.
    pub fn nearest_class(&self, id: TypeId) -> Option<&TypeInfo> {
        let mut current = self.get(id);
        while let Some(info) = current {
            if info.kind == TypeKind::Class {
                return Some(info);
            }
            current = info.parent.and_then(|p| self.get(p));
        }
        None
    }
}

/// Where a declaration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclInfo {
    pub id: DeclId,
    pub kind: DeclKind,
    /// Method name (qualified for explicit interface implementations) or
    /// operator text.
    pub name: String,
    /// Innermost enclosing type.
    pub container: Option<TypeId>,
    /// From the first token's text to the last token's text.
    pub span: Span,
    /// `span` widened to include the outer leading and trailing trivia.
    pub full_span: Span,
}

/// A parsed C# file.
#[derive(Debug, Clone)]
pub struct Tree {
    elements: Arc<Vec<Element>>,
    decls: Vec<Arc<Declaration>>,
    infos: Arc<Vec<DeclInfo>>,
    types: Arc<TypeTable>,
}

impl Tree {
    pub(crate) fn new(
        elements: Vec<Element>,
        decls: Vec<Declaration>,
        infos: Vec<DeclInfo>,
        types: TypeTable,
    ) -> Self {
        Tree {
            elements: Arc::new(elements),
            decls: decls.into_iter().map(Arc::new).collect(),
            infos: Arc::new(infos),
            types: Arc::new(types),
        }
    }

    /// A tree sharing everything with `self` except the arena.
    pub(crate) fn with_decls(&self, decls: Vec<Arc<Declaration>>) -> Self {
        Tree {
            elements: Arc::clone(&self.elements),
            decls,
            infos: Arc::clone(&self.infos),
            types: Arc::clone(&self.types),
        }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn decl(&self, id: DeclId) -> Option<&Declaration> {
        self.decls.get(id.index()).map(|d| d.as_ref())
    }

    pub(crate) fn decl_arcs(&self) -> &[Arc<Declaration>] {
        &self.decls
    }

    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }

    /// Declarations with their handles, in source order.
    pub fn decls(&self) -> impl Iterator<Item = (DeclId, &Declaration)> {
        self.decls
            .iter()
            .enumerate()
            .map(|(i, d)| (DeclId(i as u32), d.as_ref()))
    }

    pub fn info(&self, id: DeclId) -> Option<&DeclInfo> {
        self.infos.get(id.index())
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    /// True if the arena entry for `id` is the same allocation in both trees.
    pub fn shares_decl(&self, other: &Tree, id: DeclId) -> bool {
        match (self.decls.get(id.index()), other.decls.get(id.index())) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}
