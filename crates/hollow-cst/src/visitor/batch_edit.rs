// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Applying a set of declaration replacements to a tree.
//!
//! Replacements are collected into a [`ReplacementSet`] keyed by [`DeclId`]
//! and applied together by [`apply`], in a single pass over the declaration
//! arena. The input tree is never modified; the result shares every
//! declaration it did not replace with the input.
//!
//! # Example
//!
//! ```
//! use hollow_cst::{apply, parse_source, remove_body, BatchOutcome, Codegen, DeclId, Declaration, ReplacementSet};
//!
//! let tree = parse_source("class C { void A() { } }").unwrap();
//! let Some(Declaration::Method(a)) = tree.decl(DeclId(0)) else { panic!() };
//!
//! let mut set = ReplacementSet::new();
//! set.insert(DeclId(0), Declaration::Method(remove_body(a)));
//!
//! let BatchOutcome::Changed(rewritten) = apply(&tree, set).unwrap() else { panic!() };
//! assert_eq!(rewritten.to_source(), "class C { void A(); }");
//! assert_eq!(tree.to_source(), "class C { void A() { } }");
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::nodes::{DeclId, Declaration, Tree};

/// Replacements keyed by declaration handle.
///
/// Inserting twice for the same handle keeps the last replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementSet {
    replacements: BTreeMap<DeclId, Declaration>,
}

impl ReplacementSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: DeclId, replacement: Declaration) {
        self.replacements.insert(id, replacement);
    }

    pub fn get(&self, id: DeclId) -> Option<&Declaration> {
        self.replacements.get(&id)
    }

    pub fn len(&self) -> usize {
        self.replacements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = DeclId> + '_ {
        self.replacements.keys().copied()
    }
}

/// Result of [`apply`].
#[derive(Debug, Clone)]
pub enum BatchOutcome {
    /// Nothing to replace. The source file must be left alone.
    Unchanged,
    Changed(Tree),
}

impl BatchOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, BatchOutcome::Changed(_))
    }

    /// The rewritten tree, if there is one.
    pub fn tree(&self) -> Option<&Tree> {
        match self {
            BatchOutcome::Unchanged => None,
            BatchOutcome::Changed(tree) => Some(tree),
        }
    }
}

/// Error type for batch edit operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEditError {
    /// A replacement targets a handle the tree does not have.
    UnknownDeclaration { id: DeclId, decl_count: usize },
}

impl std::fmt::Display for BatchEditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchEditError::UnknownDeclaration { id, decl_count } => {
                write!(
                    f,
                    "replacement for {} but the tree has {} declarations",
                    id, decl_count
                )
            }
        }
    }
}

impl std::error::Error for BatchEditError {}

/// Result type for batch edit operations.
pub type BatchEditResult<T> = Result<T, BatchEditError>;

/// Apply `replacements` to `tree`.
///
/// # Errors
///
/// - `BatchEditError::UnknownDeclaration` if a key is not a declaration of
///   `tree`; nothing is applied in that case
pub fn apply(tree: &Tree, replacements: ReplacementSet) -> BatchEditResult<BatchOutcome> {
    if replacements.is_empty() {
        return Ok(BatchOutcome::Unchanged);
    }

    let decl_count = tree.decl_count();
    if let Some(id) = replacements.ids().find(|id| id.index() >= decl_count) {
        return Err(BatchEditError::UnknownDeclaration { id, decl_count });
    }

    let mut pending = replacements.replacements;
    let decls = tree
        .decl_arcs()
        .iter()
        .enumerate()
        .map(|(i, existing)| match pending.remove(&DeclId(i as u32)) {
            Some(replacement) => Arc::new(replacement),
            None => Arc::clone(existing),
        })
        .collect();

    Ok(BatchOutcome::Changed(tree.with_decls(decls)))
}
