// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Replacing a declaration's body with `;`.

use crate::nodes::{Body, DeclarationParts, MethodLike, Token, Trivia};

/// A copy of `decl` with its body removed and a `;` terminator in its place.
///
/// - The body goes, including the trivia in front of its opening brace.
/// - The last signature token loses its trailing trivia when that trivia is
///   only whitespace and line breaks; trailing comments stay.
/// - The `;` takes over the trivia that followed the closing brace.
///
/// An arrow body is removed the same way, its `;` keeping its trivia. A
/// declaration without a body is returned as is.
pub fn remove_body<D: MethodLike>(decl: &D) -> D {
    let DeclarationParts {
        attributes,
        modifiers,
        return_type,
        mut signature,
        body,
        terminator,
    } = decl.to_parts();

    let trailing = match body {
        Some(Body::Block(block)) => block.close.trailing,
        Some(Body::Arrow(_)) => terminator.map(|t| t.trailing).unwrap_or_default(),
        None => {
            return D::from_parts(DeclarationParts {
                attributes,
                modifiers,
                return_type,
                signature,
                body: None,
                terminator,
            })
        }
    };

    if let Some(last) = signature.last_mut() {
        if last.trailing.iter().all(Trivia::is_layout) {
            last.trailing.clear();
        }
    }

    D::from_parts(DeclarationParts {
        attributes,
        modifiers,
        return_type,
        signature,
        body: None,
        terminator: Some(Token::semicolon().with_trailing(trailing)),
    })
}
