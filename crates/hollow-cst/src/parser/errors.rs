// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

use crate::tokenizer::TokError;

#[allow(clippy::enum_variant_names)]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParserError {
    #[error("tokenizer error: {0}")]
    TokenizerError(#[from] TokError),
    #[error("unclosed '{delimiter}' opened at byte {offset}")]
    UnclosedDelimiter { delimiter: String, offset: usize },
    #[error("unexpected {found} at byte {offset}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        offset: usize,
    },
}

impl ParserError {
    /// Byte offset the error points at.
    pub fn offset(&self) -> usize {
        match self {
            ParserError::TokenizerError(e) => e.offset(),
            ParserError::UnclosedDelimiter { offset, .. }
            | ParserError::UnexpectedToken { offset, .. } => *offset,
        }
    }

    /// Short label for the offending position.
    pub fn label(&self) -> String {
        match self {
            ParserError::TokenizerError(e) => e.to_string(),
            ParserError::UnclosedDelimiter { delimiter, .. } => {
                format!("this '{}' is never closed", delimiter)
            }
            ParserError::UnexpectedToken {
                found, expected, ..
            } => format!("expected {}, found {}", expected, found),
        }
    }
}

pub type Result<T> = std::result::Result<T, ParserError>;
