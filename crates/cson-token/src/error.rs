//! Lexer error type.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::token::TokenKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("document is empty")]
    EmptyDocument,
    #[error("unexpected end of input at byte {0}")]
    EndOfInput(usize),
    #[error("unexpected character {found:?} at byte {offset}")]
    UnexpectedChar { found: char, offset: usize },
    #[error("expected {expected} but was {found} at byte {offset}")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        offset: usize,
    },
    #[error("expected a value but was {0}")]
    ExpectedValue(TokenKind),
    #[error("malformed number at byte {0}")]
    MalformedNumber(usize),
    #[error("invalid escape sequence at byte {0}")]
    InvalidEscape(usize),
    #[error("invalid UTF-8")]
    InvalidUtf8,
    #[error("did not consume the entire document: trailing content at byte {0}")]
    TrailingContent(usize),
    /// Growing the scope stack or a string buffer failed.
    #[error("allocation failed: {0}")]
    Allocation(TryReserveError),
}

impl TokenError {
    /// Byte offset the error points at, when it has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            TokenError::EndOfInput(offset)
            | TokenError::MalformedNumber(offset)
            | TokenError::InvalidEscape(offset)
            | TokenError::TrailingContent(offset) => Some(*offset),
            TokenError::UnexpectedChar { offset, .. }
            | TokenError::UnexpectedToken { offset, .. } => Some(*offset),
            TokenError::EmptyDocument
            | TokenError::ExpectedValue(_)
            | TokenError::InvalidUtf8
            | TokenError::Allocation(_) => None,
        }
    }
}
