// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Which declarations have a trivially empty body.

use crate::nodes::{Body, MethodLike, Statement};

/// Returned expressions that count as "no real implementation".
///
/// Matching is on the expression's text, so `0.0`, `(0)` and `default( T )`
/// do not match.
pub const TRIVIAL_RETURN_VALUES: [&str; 4] = ["0", "false", "null", "default(T)"];

/// Modifiers that make a declaration ineligible.
const BLOCKING_MODIFIERS: [&str; 3] = ["extern", "abstract", "virtual"];

/// True if `decl` can become an `extern` declaration.
///
/// - a `void` declaration qualifies when its block body has no statements
/// - any other declaration qualifies when its block body is exactly one
///   `return` of a value in [`TRIVIAL_RETURN_VALUES`]
///
/// Declarations marked `extern`, `abstract` or `virtual`, and those with an
/// arrow body or no body, never qualify.
pub fn is_eligible<D: MethodLike + ?Sized>(decl: &D) -> bool {
    if BLOCKING_MODIFIERS.iter().any(|m| decl.has_modifier(m)) {
        return false;
    }

    let Some(Body::Block(block)) = decl.body() else {
        return false;
    };

    if decl.return_type().is_void() {
        return block.statements.is_empty();
    }

    match block.statements.as_slice() {
        [Statement::Return(ret)] => ret
            .expression
            .as_ref()
            .is_some_and(|e| TRIVIAL_RETURN_VALUES.contains(&e.text().as_str())),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{Declaration, DeclId};
    use crate::parse_source;

    /// Parse `member` inside a class and check the first declaration.
    fn eligible(member: &str) -> bool {
        let source = format!("class C\n{{\n    {}\n}}\n", member);
        let tree = parse_source(&source).unwrap();
        let decl = tree.decl(DeclId(0)).expect("a declaration");
        match decl {
            Declaration::Method(m) => is_eligible(m),
            Declaration::Operator(o) => is_eligible(o),
            other => panic!("unexpected {:?}", other.kind()),
        }
    }

    #[test]
    fn empty_void_methods_qualify() {
        assert!(eligible("void Foo() { }"));
        assert!(eligible("public static void Foo(int x) {}"));
        assert!(eligible("void Foo()\n    {\n        // nothing\n    }"));
    }

    #[test]
    fn void_methods_with_statements_do_not() {
        assert!(!eligible("void Foo() { ; }"));
        assert!(!eligible("void Foo() { return; }"));
        assert!(!eligible("void Foo() { { } }"));
        assert!(!eligible("void Foo() { Bar(); }"));
    }

    #[test]
    fn trivial_returns_qualify() {
        assert!(eligible("int Bar() { return 0; }"));
        assert!(eligible("bool Bar() { return false; }"));
        assert!(eligible("string Bar() { return null; }"));
        assert!(eligible("T Bar<T>() { return default(T); }"));
        assert!(eligible("int Bar() { return   0 ; }"));
        assert!(eligible("int Bar() { /* stub */ return 0; }"));
    }

    #[test]
    fn other_returns_do_not() {
        assert!(!eligible("double Bar() { return 0.0; }"));
        assert!(!eligible("int Bar() { return (0); }"));
        assert!(!eligible("T Bar<T>() { return default( T ); }"));
        assert!(!eligible("T Bar<T>() { return default; }"));
        assert!(!eligible("bool Bar() { return true; }"));
        assert!(!eligible("int Sum(int a, int b) { return a + b; }"));
        assert!(!eligible("int Bar() { Log(); return 0; }"));
        assert!(!eligible("int Bar() { return 0; return 0; }"));
    }

    #[test]
    fn void_needs_the_exact_keyword() {
        // Not the single keyword `void`, so a return is required.
        assert!(!eligible("unsafe void* Ptr() { }"));
        assert!(eligible("unsafe void* Ptr() { return null; }"));
    }

    #[test]
    fn blocking_modifiers() {
        assert!(!eligible("extern void Foo();"));
        assert!(!eligible("abstract void Qux();"));
        assert!(!eligible("public virtual void Foo() { }"));
        assert!(!eligible("public abstract int Foo() { return 0; }"));
    }

    #[test]
    fn arrow_and_missing_bodies() {
        assert!(!eligible("int Bar() => 0;"));
        assert!(!eligible("void Foo() => Bar();"));
        assert!(!eligible("partial void Foo();"));
    }

    #[test]
    fn operators_follow_the_same_rules() {
        assert!(eligible("public static bool operator ==(C a, C b) { return false; }"));
        assert!(!eligible("public static bool operator !=(C a, C b) { return !(a == b); }"));
        assert!(!eligible("public static C operator +(C a, C b) => null;"));
    }
}
