// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Adding a modifier keyword to a declaration.
//!
//! The new keyword always goes last in the modifier list, right before the
//! return type. Trivia is relocated so the declaration keeps its layout:
//!
//! ```text
//! public static bool Baz()      ->  public static extern bool Baz()
//!               ^^^ anchor: trailing trivia of `static` moves to `extern`
//!
//!     // doc
//!     int Bar()                 ->      // doc
//!                                       extern int Bar()
//!     ^^^ anchor: leading trivia of `int` moves to `extern`
//! ```

use crate::nodes::{move_trivia, DeclarationParts, MethodLike, Token, Trivia, TriviaSide};

/// The modifier that marks an externally implemented member.
pub const EXTERN_KEYWORD: &str = "extern";

/// A copy of `decl` with `keyword` appended to its modifiers.
///
/// When the declaration already has modifiers, the last one's trailing
/// trivia moves to the new keyword and the last one is left with a single
/// space. Otherwise the return type's leading trivia moves to the new
/// keyword and the return type is left with a single leading space. If the
/// anchor token had no trivia on that side, the new keyword gets one space
/// on the side facing it.
pub fn insert_modifier<D: MethodLike>(decl: &D, keyword: &str) -> D {
    let parts = decl.to_parts();
    let new_token = Token::keyword(keyword);

    let parts = match parts.modifiers.split_last() {
        Some((last, rest)) => {
            let (last, new_token) = if last.trailing.is_empty() {
                (last.clone(), new_token.with_leading(vec![Trivia::space()]))
            } else {
                move_trivia(last, &new_token, TriviaSide::Trailing, Some(Trivia::space()))
            };
            let mut modifiers = rest.to_vec();
            modifiers.push(last);
            modifiers.push(new_token);
            DeclarationParts { modifiers, ..parts }
        }
        None => match parts.return_type.first_token() {
            Some(first) => {
                let (first, new_token) = if first.leading.is_empty() {
                    (first.clone(), new_token.with_trailing(vec![Trivia::space()]))
                } else {
                    move_trivia(first, &new_token, TriviaSide::Leading, Some(Trivia::space()))
                };
                let return_type = parts.return_type.with_first_token(first);
                DeclarationParts {
                    modifiers: vec![new_token],
                    return_type,
                    ..parts
                }
            }
            // Every method and operator has a return type.
            None => DeclarationParts {
                modifiers: vec![new_token.with_trailing(vec![Trivia::space()])],
                ..parts
            },
        },
    };

    D::from_parts(parts)
}
