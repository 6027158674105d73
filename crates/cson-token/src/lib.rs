//! Pull-style JSON token source.
//!
//! [`TokenSource`] is the seam between a lexer and the tree builder in the
//! `cson` crate; [`TextReader`] is the lexer for in-memory JSON text.

mod error;
mod reader;
mod token;

pub use error::TokenError;
pub use reader::TextReader;
pub use token::{TokenKind, TokenSource};
