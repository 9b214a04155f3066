// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Rewrites over parsed trees.
//!
//! The pieces, from the bottom up:
//!
//! - [`is_eligible`] decides whether a declaration's body is trivially empty
//! - [`insert_modifier`] adds a modifier keyword, relocating trivia
//! - [`remove_body`] swaps a body for a `;` terminator
//! - [`apply`] substitutes a [`ReplacementSet`] into a tree in one pass
//! - [`externalize`] drives all of the above over a whole tree
//!
//! The first three are written once against [`MethodLike`](crate::MethodLike)
//! and work for methods and operators alike. Every function here is pure: it
//! returns new values and leaves its inputs alone.

mod batch_edit;
mod body;
mod externalize;
mod modifier;
mod predicate;

pub use batch_edit::{apply, BatchEditError, BatchEditResult, BatchOutcome, ReplacementSet};
pub use body::remove_body;
pub use externalize::{externalize, transform_declaration, Externalized, Rewrite, RewriteError};
pub use modifier::{insert_modifier, EXTERN_KEYWORD};
pub use predicate::{is_eligible, TRIVIAL_RETURN_VALUES};
