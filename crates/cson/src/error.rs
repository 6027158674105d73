//! Error type shared by the parser, writers and accessors.

use cson_token::TokenError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsonError {
    #[error("syntax error: {0}")]
    Syntax(TokenError),
    #[error("failed parsing JSON source to a document tree: {source}")]
    ParseFailure {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("cannot convert {input:?} to {target}")]
    Conversion { target: &'static str, input: String },
    #[error("missing key `{0}`")]
    MissingKey(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("illegal writer event: {0}")]
    Structural(&'static str),
    #[error("incomplete document: {open} container(s) still open")]
    IncompleteDocument { open: usize },
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("JSON forbids NaN and infinities: {0}")]
    NonFiniteNumber(f64),
    #[error("invalid number text {0:?}")]
    InvalidNumber(String),
    #[error("integer {0} is out of range for the target format")]
    NumberOutOfRange(String),
    #[error("nesting exceeds the limit of {limit} levels")]
    DepthLimit { limit: usize },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Custom(String),
}

impl CsonError {
    pub(crate) fn parse_failure<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        CsonError::ParseFailure {
            source: Box::new(source),
        }
    }

    pub(crate) fn conversion(target: &'static str, input: impl Into<String>) -> Self {
        CsonError::Conversion {
            target,
            input: input.into(),
        }
    }
}

/// Lexer allocation failures are resource exhaustion, not bad input.
impl From<TokenError> for CsonError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Allocation(cause) => CsonError::parse_failure(cause),
            other => CsonError::Syntax(other),
        }
    }
}

impl serde::ser::Error for CsonError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        CsonError::Custom(msg.to_string())
    }
}

impl serde::de::Error for CsonError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        CsonError::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CsonError>;

#[cfg(test)]
mod tests {
    use std::collections::TryReserveError;
    use std::error::Error as _;

    use super::*;

    fn reserve_failure() -> TryReserveError {
        Vec::<u8>::new().try_reserve(usize::MAX).unwrap_err()
    }

    #[test]
    fn allocation_failures_become_parse_failures() {
        let err = CsonError::parse_failure(reserve_failure());
        assert!(err.to_string().starts_with("failed parsing JSON source to a document tree: "));
        assert!(err
            .source()
            .and_then(|source| source.downcast_ref::<TryReserveError>())
            .is_some());

        let err = CsonError::from(TokenError::Allocation(reserve_failure()));
        assert!(matches!(err, CsonError::ParseFailure { .. }));
    }

    #[test]
    fn other_lexer_errors_are_syntax_errors() {
        let err = CsonError::from(TokenError::MalformedNumber(3));
        assert!(matches!(err, CsonError::Syntax(TokenError::MalformedNumber(3))));
        assert_eq!(err.to_string(), "syntax error: malformed number at byte 3");
    }
}
