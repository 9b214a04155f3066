// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Turning trivially empty methods and operators into `extern` declarations.
//!
//! [`externalize`] walks the declarations of a tree in source order. A
//! declaration is a candidate when it is a method or an operator and some
//! enclosing type is a class; structs, records and interfaces on their own do
//! not count. Candidates that pass [`is_eligible`] are rewritten by
//! [`transform_declaration`]: `extern` is inserted, then the body is removed.
//! All rewrites of the file are applied together at the end.
//!
//! Each decision depends only on the declaration itself, so the result does
//! not depend on the order in which declarations are visited.

use hollow_core::output::DeclarationKind;
use hollow_core::patch::Span;
use thiserror::Error;
use tracing::debug;

use super::batch_edit::{apply, BatchEditError, BatchOutcome, ReplacementSet};
use super::body::remove_body;
use super::modifier::{insert_modifier, EXTERN_KEYWORD};
use super::predicate::is_eligible;
use crate::nodes::{Codegen, DeclId, DeclKind, Declaration, Tree, TypeId, TypeTable};

/// Errors from [`externalize`] and [`transform_declaration`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    /// A body-bearing declaration that is neither a method nor an operator
    /// was handed to the transformation.
    #[error("cannot externalize a {kind} declaration")]
    UnsupportedDeclarationKind { kind: DeclKind },

    #[error("batch edit failed: {0}")]
    Batch(#[from] BatchEditError),
}

/// One rewritten declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub id: DeclId,
    pub kind: DeclarationKind,
    /// Method name or operator text.
    pub name: String,
    /// Dotted name of the nearest enclosing class, e.g. `Outer.Inner`.
    pub class: String,
    /// Declaration text in the original source.
    pub span: Span,
    /// Declaration with its surrounding trivia in the original source.
    pub full_span: Span,
    /// What `full_span` is replaced with.
    pub replacement_text: String,
}

/// Result of [`externalize`].
#[derive(Debug, Clone)]
pub struct Externalized {
    pub outcome: BatchOutcome,
    /// Rewritten declarations in source order.
    pub changes: Vec<Rewrite>,
    /// Dotted names of the classes that had at least one rewrite, in source
    /// order, each once.
    pub classes: Vec<String>,
}

impl Externalized {
    pub fn is_changed(&self) -> bool {
        self.outcome.is_changed()
    }

    pub fn count(&self, kind: DeclarationKind) -> usize {
        self.changes.iter().filter(|c| c.kind == kind).count()
    }
}

/// Rewrite one declaration into its `extern` form.
///
/// Eligibility is not checked here.
///
/// # Errors
///
/// `RewriteError::UnsupportedDeclarationKind` for constructors, destructors
/// and conversion operators.
pub fn transform_declaration(decl: &Declaration) -> Result<Declaration, RewriteError> {
    match decl {
        Declaration::Method(m) => Ok(Declaration::Method(remove_body(&insert_modifier(
            m,
            EXTERN_KEYWORD,
        )))),
        Declaration::Operator(o) => Ok(Declaration::Operator(remove_body(&insert_modifier(
            o,
            EXTERN_KEYWORD,
        )))),
        Declaration::Constructor(_)
        | Declaration::Destructor(_)
        | Declaration::ConversionOperator(_) => Err(RewriteError::UnsupportedDeclarationKind {
            kind: decl.kind(),
        }),
    }
}

/// Dotted name of `id`, outermost type first.
fn qualified_name(types: &TypeTable, id: TypeId) -> String {
    let mut names = Vec::new();
    let mut current = types.get(id);
    while let Some(info) = current {
        names.push(info.name.as_str());
        current = info.parent.and_then(|p| types.get(p));
    }
    names.reverse();
    names.join(".")
}

/// Rewrite every eligible method and operator of `tree` declared in a class.
///
/// The input tree is left as it was. When nothing is eligible the outcome is
/// [`BatchOutcome::Unchanged`].
pub fn externalize(tree: &Tree) -> Result<Externalized, RewriteError> {
    let mut replacements = ReplacementSet::new();
    let mut changes = Vec::new();
    let mut touched: Vec<TypeId> = Vec::new();

    for (id, decl) in tree.decls() {
        let kind = match decl.kind() {
            DeclKind::Method => DeclarationKind::Method,
            DeclKind::Operator => DeclarationKind::Operator,
            _ => continue,
        };
        let Some(info) = tree.info(id) else {
            continue;
        };
        let Some(class) = info
            .container
            .and_then(|c| tree.types().nearest_class(c))
        else {
            debug!("{} {} is not inside a class, skipping", kind, info.name);
            continue;
        };
        let Some(method_like) = decl.as_method_like() else {
            continue;
        };
        if !is_eligible(method_like) {
            debug!("{} {}.{} is not eligible", kind, class.name, info.name);
            continue;
        }

        let replacement = transform_declaration(decl)?;
        let class_name = qualified_name(tree.types(), class.id);
        debug!("externalizing {} {}.{}", kind, class_name, info.name);

        if !touched.contains(&class.id) {
            touched.push(class.id);
        }
        changes.push(Rewrite {
            id,
            kind,
            name: info.name.clone(),
            class: class_name,
            span: info.span,
            full_span: info.full_span,
            replacement_text: replacement.to_source(),
        });
        replacements.insert(id, replacement);
    }

    let classes = touched
        .into_iter()
        .map(|id| qualified_name(tree.types(), id))
        .collect();
    let outcome = apply(tree, replacements)?;

    Ok(Externalized {
        outcome,
        changes,
        classes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_source;

    fn run(source: &str) -> (Externalized, String) {
        let tree = parse_source(source).unwrap();
        let result = externalize(&tree).unwrap();
        let text = match result.outcome.tree() {
            Some(rewritten) => rewritten.to_source(),
            None => source.to_string(),
        };
        (result, text)
    }

    #[test]
    fn rewrites_and_reports() {
        let source = "class A\n{\n    void F() { }\n    int G() { return 1; }\n    static bool operator !(A a) { return false; }\n}\n";
        let (result, text) = run(source);
        assert_eq!(
            text,
            "class A\n{\n    extern void F();\n    int G() { return 1; }\n    static extern bool operator !(A a);\n}\n"
        );
        assert_eq!(result.changes.len(), 2);
        assert_eq!(result.count(DeclarationKind::Method), 1);
        assert_eq!(result.count(DeclarationKind::Operator), 1);
        assert_eq!(result.changes[1].name, "!");
        assert_eq!(result.classes, vec!["A".to_string()]);
    }

    #[test]
    fn nothing_eligible_is_unchanged() {
        let (result, text) = run("class A { int G() => 0; }");
        assert!(!result.is_changed());
        assert!(result.changes.is_empty());
        assert!(result.classes.is_empty());
        assert_eq!(text, "class A { int G() => 0; }");
    }

    #[test]
    fn only_classes_are_candidates() {
        let source = "struct S { void F() { } }\ninterface I { void G() { } }\nrecord R { void H() { } }\n";
        let (result, text) = run(source);
        assert!(!result.is_changed());
        assert_eq!(text, source);
    }

    #[test]
    fn nested_types_use_nearest_class() {
        let source = "class Outer\n{\n    class Inner { void F() { } }\n    struct S { void G() { } }\n}\n";
        let (result, _) = run(source);
        let classes: Vec<_> = result.changes.iter().map(|c| c.class.as_str()).collect();
        assert_eq!(classes, vec!["Outer.Inner", "Outer"]);
        assert_eq!(result.classes, vec!["Outer.Inner".to_string(), "Outer".to_string()]);
    }

    #[test]
    fn constructors_are_not_candidates() {
        let (result, _) = run("class A { public A() { } ~A() { } }");
        assert!(!result.is_changed());
    }

    #[test]
    fn transform_rejects_other_kinds() {
        let tree = parse_source("class A { public A() { } }").unwrap();
        let decl = tree.decl(DeclId(0)).unwrap();
        assert_eq!(
            transform_declaration(decl),
            Err(RewriteError::UnsupportedDeclarationKind {
                kind: DeclKind::Constructor
            })
        );
        assert_eq!(
            transform_declaration(decl).unwrap_err().to_string(),
            "cannot externalize a constructor declaration"
        );
    }

    #[test]
    fn replacement_text_covers_full_span() {
        let source = "class A\n{\n    // doc\n    void F() { }\n}\n";
        let (result, _) = run(source);
        let change = &result.changes[0];
        assert_eq!(&source[change.full_span.range()], "    // doc\n    void F() { }\n");
        assert_eq!(change.replacement_text, "    // doc\n    extern void F();\n");
        assert_eq!(&source[change.span.range()], "void F() { }");
    }
}
