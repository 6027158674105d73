//! Token stream to tree, without recursion.

use std::mem;

use cson_token::{TextReader, TokenError, TokenKind, TokenSource};

use crate::error::{CsonError, Result};
use crate::value::tree::Container;
use crate::value::{Array, Object, Value};

struct Frame {
    container: Container,
    /// Member name the finished container is stored under in its parent.
    name: Option<String>,
}

fn open<S: TokenSource + ?Sized>(source: &mut S, kind: TokenKind) -> Result<Option<Container>> {
    match kind {
        TokenKind::BeginArray => {
            source.begin_array()?;
            Ok(Some(Container::Array(Array::new())))
        }
        TokenKind::BeginObject => {
            source.begin_object()?;
            Ok(Some(Container::Object(Object::new())))
        }
        _ => Ok(None),
    }
}

fn read_terminal<S: TokenSource + ?Sized>(source: &mut S, kind: TokenKind) -> Result<Value> {
    match kind {
        TokenKind::String => Ok(Value::from(source.next_string()?)),
        TokenKind::Number => Ok(Value::lazy_number(source.next_number()?)),
        TokenKind::Boolean => Ok(Value::from(source.next_boolean()?)),
        TokenKind::Null => {
            source.next_null()?;
            Ok(Value::Null)
        }
        other => Err(TokenError::ExpectedValue(other).into()),
    }
}

fn close<S: TokenSource + ?Sized>(source: &mut S, container: &Container) -> Result<()> {
    if container.is_object() {
        source.end_object()?;
    } else {
        source.end_array()?;
    }
    Ok(())
}

/// Reads one value from `source`.
///
/// Nested containers are tracked on an explicit stack, so the accepted
/// depth is bounded by memory only. An empty source yields `Null`. Numbers
/// are kept as lazily parsed text. Content after the value is left to the
/// caller.
pub fn parse_source<S: TokenSource + ?Sized>(source: &mut S) -> Result<Value> {
    let kind = match source.peek() {
        Ok(kind) => kind,
        Err(TokenError::EmptyDocument) => return Ok(Value::Null),
        Err(err) => return Err(err.into()),
    };
    let Some(container) = open(source, kind)? else {
        return read_terminal(source, kind);
    };
    let mut current = Frame {
        container,
        name: None,
    };
    let mut stack: Vec<Frame> = Vec::new();
    loop {
        if source.has_next()? {
            let name = if current.container.is_object() {
                Some(source.next_name()?)
            } else {
                None
            };
            let kind = source.peek()?;
            match open(source, kind)? {
                Some(container) => {
                    stack.try_reserve(1).map_err(CsonError::parse_failure)?;
                    stack.push(mem::replace(&mut current, Frame { container, name }));
                }
                None => {
                    let value = read_terminal(source, kind)?;
                    current.container.deposit(name, value)?;
                }
            }
        } else {
            let Frame { container, name } = current;
            close(source, &container)?;
            let finished = container.into_value();
            match stack.pop() {
                Some(mut parent) => {
                    parent.container.deposit(name, finished)?;
                    current = parent;
                }
                None => return Ok(finished),
            }
        }
    }
}

/// Parses a complete JSON document. Anything but whitespace after the
/// top-level value is a syntax error.
pub fn from_str(input: &str) -> Result<Value> {
    parse_document(TextReader::new(input))
}

/// [`from_str`] over UTF-8 bytes.
pub fn from_slice(input: &[u8]) -> Result<Value> {
    parse_document(TextReader::from_slice(input)?)
}

fn parse_document(mut reader: TextReader<'_>) -> Result<Value> {
    let value = parse_source(&mut reader)?;
    reader.finish()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_null() {
        assert_eq!(from_str("").unwrap(), Value::Null);
        assert_eq!(from_str(" \n\t ").unwrap(), Value::Null);
    }

    #[test]
    fn scalar_documents() {
        assert_eq!(from_str("true").unwrap(), Value::from(true));
        assert_eq!(from_str("null").unwrap(), Value::Null);
        assert_eq!(from_str(r#""hi""#).unwrap(), Value::from("hi"));
        let number = from_str("1.50").unwrap();
        assert_eq!(number, Value::from(1.5));
        assert_eq!(number.to_string(), "1.50");
    }

    #[test]
    fn nested_document() {
        let value = from_str(r#"{"a": [1, {"b": null}], "c": {}}"#).unwrap();
        let expected = Object::new()
            .with("a", Array::new().with(1).with(Object::new().with("b", Value::Null)))
            .with("c", Object::new());
        assert_eq!(value, Value::from(expected));
    }

    #[test]
    fn member_order_is_preserved() {
        let value = from_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn malformed_input_is_a_syntax_error() {
        for input in ["[1,", "{\"a\"}", "[1 2]", "{\"a\":}", "tru", "-", "[}"] {
            assert!(
                matches!(from_str(input), Err(CsonError::Syntax(_))),
                "{input}"
            );
        }
    }

    #[test]
    fn trailing_content_is_rejected() {
        assert!(matches!(
            from_str("[] []"),
            Err(CsonError::Syntax(TokenError::TrailingContent(3)))
        ));
        assert!(matches!(
            from_str("null x"),
            Err(CsonError::Syntax(TokenError::TrailingContent(5)))
        ));
    }

    #[test]
    fn parse_source_leaves_trailing_content_alone() {
        let mut reader = TextReader::new("1 2");
        assert_eq!(parse_source(&mut reader).unwrap(), Value::from(1));
        assert!(reader.finish().is_err());
    }

    #[test]
    fn invalid_utf8_is_a_syntax_error() {
        assert!(matches!(
            from_slice(b"\"\xff\""),
            Err(CsonError::Syntax(TokenError::InvalidUtf8))
        ));
    }
}
