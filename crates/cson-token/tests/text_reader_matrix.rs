use cson_token::{TextReader, TokenError, TokenKind, TokenSource};
use proptest::prelude::*;

fn escape_all(input: &str) -> String {
    let mut out = String::from("\"");
    for unit in input.encode_utf16() {
        out.push_str(&format!("\\u{unit:04x}"));
    }
    out.push('"');
    out
}

// ------------------------------------------------------------------
// Structure

#[test]
fn deep_nesting_does_not_recurse() {
    let depth = 100_000;
    let text = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
    let mut reader = TextReader::new(&text);
    for _ in 0..depth {
        reader.begin_array().unwrap();
    }
    assert_eq!(reader.depth(), depth);
    for _ in 0..depth {
        assert!(!reader.has_next().unwrap());
        reader.end_array().unwrap();
    }
    reader.finish().unwrap();
}

#[test]
fn object_members_require_colon_and_comma() {
    let mut reader = TextReader::new(r#"{"a" 1}"#);
    reader.begin_object().unwrap();
    assert_eq!(reader.next_name().unwrap(), "a");
    assert!(matches!(
        reader.peek(),
        Err(TokenError::UnexpectedChar { found: '1', offset: 5 })
    ));

    let mut reader = TextReader::new(r#"{"a":1 "b":2}"#);
    reader.begin_object().unwrap();
    reader.next_name().unwrap();
    reader.next_number().unwrap();
    assert!(matches!(
        reader.peek(),
        Err(TokenError::UnexpectedChar { found: '"', offset: 7 })
    ));
}

#[test]
fn trailing_commas_are_rejected() {
    let mut reader = TextReader::new("[1,]");
    reader.begin_array().unwrap();
    reader.next_number().unwrap();
    assert!(matches!(
        reader.peek(),
        Err(TokenError::UnexpectedChar { found: ']', offset: 3 })
    ));

    let mut reader = TextReader::new(r#"{"a":1,}"#);
    reader.begin_object().unwrap();
    reader.next_name().unwrap();
    reader.next_number().unwrap();
    assert!(reader.peek().is_err());
}

#[test]
fn scalar_documents() {
    let mut reader = TextReader::new(" true ");
    assert_eq!(reader.peek().unwrap(), TokenKind::Boolean);
    assert!(reader.next_boolean().unwrap());
    reader.finish().unwrap();

    let mut reader = TextReader::new("null");
    reader.next_null().unwrap();
    assert_eq!(reader.peek().unwrap(), TokenKind::EndOfDocument);
}

#[test]
fn literal_prefixes_are_not_accepted() {
    for text in ["nul", "nulll", "tru", "falsey"] {
        let mut reader = TextReader::new(text);
        assert!(reader.peek().is_err(), "{text}");
    }
}

#[test]
fn finish_mid_document_reports_unexpected_token() {
    let mut reader = TextReader::new("[1]");
    reader.begin_array().unwrap();
    assert_eq!(
        reader.finish(),
        Err(TokenError::UnexpectedToken {
            expected: TokenKind::EndOfDocument,
            found: TokenKind::Number,
            offset: 1
        })
    );
}

#[test]
fn error_offsets_are_exposed() {
    assert_eq!(TokenError::TrailingContent(4).offset(), Some(4));
    assert_eq!(TokenError::InvalidUtf8.offset(), None);
}

// ------------------------------------------------------------------
// Properties

proptest! {
    #[test]
    fn integers_lex_verbatim(n in any::<i64>()) {
        let text = n.to_string();
        let mut reader = TextReader::new(&text);
        prop_assert_eq!(reader.next_number().unwrap(), text);
    }

    #[test]
    fn unicode_escapes_decode_to_original(s in any::<String>()) {
        let text = escape_all(&s);
        let mut reader = TextReader::new(&text);
        prop_assert_eq!(reader.next_string().unwrap(), s);
    }

    #[test]
    fn raw_strings_without_specials_pass_through(s in "[^\"\\\\\\x00-\\x1f]*") {
        let text = format!("\"{s}\"");
        let mut reader = TextReader::new(&text);
        prop_assert_eq!(reader.next_string().unwrap(), s);
    }
}
