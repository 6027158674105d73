//! Token kinds and the pull-style token source contract.

use std::fmt;

use crate::error::TokenError;

/// Kind of the next token a [`TokenSource`] will yield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    BeginArray,
    EndArray,
    BeginObject,
    EndObject,
    /// A member name inside an object.
    Name,
    String,
    Number,
    Boolean,
    Null,
    /// The top-level value has been fully consumed.
    EndOfDocument,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::BeginArray => "BEGIN_ARRAY",
            TokenKind::EndArray => "END_ARRAY",
            TokenKind::BeginObject => "BEGIN_OBJECT",
            TokenKind::EndObject => "END_OBJECT",
            TokenKind::Name => "NAME",
            TokenKind::String => "STRING",
            TokenKind::Number => "NUMBER",
            TokenKind::Boolean => "BOOLEAN",
            TokenKind::Null => "NULL",
            TokenKind::EndOfDocument => "END_DOCUMENT",
        }
    }

    /// `true` for tokens that open a container.
    pub fn is_container_start(self) -> bool {
        matches!(self, TokenKind::BeginArray | TokenKind::BeginObject)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lexer that hands out JSON tokens one at a time.
///
/// `peek` is idempotent: it reports the kind of the next token without
/// consuming it. Every consuming method fails with
/// [`TokenError::UnexpectedToken`] when the next token is of another kind.
/// A source holding nothing but whitespace reports
/// [`TokenError::EmptyDocument`] from its first `peek`.
pub trait TokenSource {
    fn peek(&mut self) -> Result<TokenKind, TokenError>;

    /// `true` while the current container has more elements.
    fn has_next(&mut self) -> Result<bool, TokenError> {
        Ok(!matches!(
            self.peek()?,
            TokenKind::EndArray | TokenKind::EndObject | TokenKind::EndOfDocument
        ))
    }

    fn begin_array(&mut self) -> Result<(), TokenError>;
    fn end_array(&mut self) -> Result<(), TokenError>;
    fn begin_object(&mut self) -> Result<(), TokenError>;
    fn end_object(&mut self) -> Result<(), TokenError>;
    fn next_name(&mut self) -> Result<String, TokenError>;
    fn next_string(&mut self) -> Result<String, TokenError>;
    /// Returns the number exactly as written in the input.
    fn next_number(&mut self) -> Result<String, TokenError>;
    fn next_boolean(&mut self) -> Result<bool, TokenError>;
    fn next_null(&mut self) -> Result<(), TokenError>;
}

impl<T: TokenSource + ?Sized> TokenSource for &mut T {
    fn peek(&mut self) -> Result<TokenKind, TokenError> {
        (**self).peek()
    }

    fn has_next(&mut self) -> Result<bool, TokenError> {
        (**self).has_next()
    }

    fn begin_array(&mut self) -> Result<(), TokenError> {
        (**self).begin_array()
    }

    fn end_array(&mut self) -> Result<(), TokenError> {
        (**self).end_array()
    }

    fn begin_object(&mut self) -> Result<(), TokenError> {
        (**self).begin_object()
    }

    fn end_object(&mut self) -> Result<(), TokenError> {
        (**self).end_object()
    }

    fn next_name(&mut self) -> Result<String, TokenError> {
        (**self).next_name()
    }

    fn next_string(&mut self) -> Result<String, TokenError> {
        (**self).next_string()
    }

    fn next_number(&mut self) -> Result<String, TokenError> {
        (**self).next_number()
    }

    fn next_boolean(&mut self) -> Result<bool, TokenError> {
        (**self).next_boolean()
    }

    fn next_null(&mut self) -> Result<(), TokenError> {
        (**self).next_null()
    }
}
