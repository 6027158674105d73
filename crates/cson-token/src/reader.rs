//! JSON text lexer implementing [`TokenSource`].
//!
//! The reader keeps an explicit stack of scopes instead of recursing, so the
//! nesting depth it accepts is bounded only by memory. Scope transitions
//! happen while peeking; consuming a token only moves the cursor.

use crate::error::TokenError;
use crate::token::{TokenKind, TokenSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    EmptyDocument,
    NonEmptyDocument,
    EmptyArray,
    NonEmptyArray,
    EmptyObject,
    DanglingName,
    NonEmptyObject,
}

#[derive(Debug, Clone, Copy)]
struct Peeked {
    kind: TokenKind,
    start: usize,
    end: usize,
}

/// Pull lexer over an in-memory JSON document.
///
/// Lenient mode (the default) additionally accepts the `NaN`, `Infinity`
/// and `-Infinity` number literals.
#[derive(Debug, Clone)]
pub struct TextReader<'a> {
    input: &'a str,
    pos: usize,
    stack: Vec<Scope>,
    peeked: Option<Peeked>,
    lenient: bool,
}

impl<'a> TextReader<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            stack: vec![Scope::EmptyDocument],
            peeked: None,
            lenient: true,
        }
    }

    /// Validates `input` as UTF-8 and reads from it.
    pub fn from_slice(input: &'a [u8]) -> Result<Self, TokenError> {
        let input = std::str::from_utf8(input).map_err(|_| TokenError::InvalidUtf8)?;
        Ok(Self::new(input))
    }

    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    pub fn is_lenient(&self) -> bool {
        self.lenient
    }

    /// Byte offset of the cursor.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of containers currently open.
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    /// Succeeds only when nothing but whitespace follows the top-level value.
    pub fn finish(&mut self) -> Result<(), TokenError> {
        let peeked = self.fill_peek()?;
        if peeked.kind == TokenKind::EndOfDocument {
            Ok(())
        } else {
            Err(TokenError::UnexpectedToken {
                expected: TokenKind::EndOfDocument,
                found: peeked.kind,
                offset: peeked.start,
            })
        }
    }

    fn bytes(&self) -> &'a [u8] {
        self.input.as_bytes()
    }

    fn current(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.current() {
            self.pos += 1;
        }
    }

    fn top(&self) -> Scope {
        self.stack.last().copied().unwrap_or(Scope::NonEmptyDocument)
    }

    fn set_top(&mut self, scope: Scope) {
        if let Some(top) = self.stack.last_mut() {
            *top = scope;
        }
    }

    fn unexpected_at(&self, offset: usize) -> TokenError {
        match self.input.get(offset..).and_then(|rest| rest.chars().next()) {
            Some(found) => TokenError::UnexpectedChar { found, offset },
            None => TokenError::EndOfInput(offset),
        }
    }

    fn punct(&self, kind: TokenKind) -> Peeked {
        Peeked {
            kind,
            start: self.pos,
            end: self.pos + 1,
        }
    }

    fn fill_peek(&mut self) -> Result<Peeked, TokenError> {
        if let Some(peeked) = self.peeked {
            return Ok(peeked);
        }
        let peeked = self.scan()?;
        self.peeked = Some(peeked);
        Ok(peeked)
    }

    fn scan(&mut self) -> Result<Peeked, TokenError> {
        match self.top() {
            Scope::EmptyArray => {
                self.set_top(Scope::NonEmptyArray);
                self.skip_whitespace();
                if self.current() == Some(b']') {
                    return Ok(self.punct(TokenKind::EndArray));
                }
            }
            Scope::NonEmptyArray => {
                self.skip_whitespace();
                match self.current() {
                    Some(b']') => return Ok(self.punct(TokenKind::EndArray)),
                    Some(b',') => self.pos += 1,
                    _ => return Err(self.unexpected_at(self.pos)),
                }
            }
            scope @ (Scope::EmptyObject | Scope::NonEmptyObject) => {
                self.skip_whitespace();
                match self.current() {
                    Some(b'}') => return Ok(self.punct(TokenKind::EndObject)),
                    Some(b',') if scope == Scope::NonEmptyObject => {
                        self.pos += 1;
                        self.skip_whitespace();
                    }
                    Some(b'"') if scope == Scope::EmptyObject => {}
                    _ => return Err(self.unexpected_at(self.pos)),
                }
                return match self.current() {
                    Some(b'"') => Ok(Peeked {
                        kind: TokenKind::Name,
                        start: self.pos,
                        end: self.pos,
                    }),
                    _ => Err(self.unexpected_at(self.pos)),
                };
            }
            Scope::DanglingName => {
                self.set_top(Scope::NonEmptyObject);
                self.skip_whitespace();
                match self.current() {
                    Some(b':') => self.pos += 1,
                    _ => return Err(self.unexpected_at(self.pos)),
                }
            }
            Scope::EmptyDocument => {
                self.set_top(Scope::NonEmptyDocument);
                self.skip_whitespace();
                if self.current().is_none() {
                    return Err(TokenError::EmptyDocument);
                }
            }
            Scope::NonEmptyDocument => {
                self.skip_whitespace();
                return match self.current() {
                    None => Ok(Peeked {
                        kind: TokenKind::EndOfDocument,
                        start: self.pos,
                        end: self.pos,
                    }),
                    Some(_) => Err(TokenError::TrailingContent(self.pos)),
                };
            }
        }
        self.skip_whitespace();
        self.scan_value()
    }

    fn scan_value(&mut self) -> Result<Peeked, TokenError> {
        let start = self.pos;
        match self.current() {
            None => Err(TokenError::EndOfInput(start)),
            Some(b'{') => Ok(self.punct(TokenKind::BeginObject)),
            Some(b'[') => Ok(self.punct(TokenKind::BeginArray)),
            Some(b'"') => Ok(Peeked {
                kind: TokenKind::String,
                start,
                end: start,
            }),
            Some(b't') => self.scan_literal(start, "true", TokenKind::Boolean),
            Some(b'f') => self.scan_literal(start, "false", TokenKind::Boolean),
            Some(b'n') => self.scan_literal(start, "null", TokenKind::Null),
            Some(b'N') if self.lenient => self.scan_literal(start, "NaN", TokenKind::Number),
            Some(b'I') if self.lenient => self.scan_literal(start, "Infinity", TokenKind::Number),
            Some(b'-' | b'0'..=b'9') => self.scan_number(start),
            Some(_) => Err(self.unexpected_at(start)),
        }
    }

    fn scan_literal(
        &self,
        start: usize,
        word: &str,
        kind: TokenKind,
    ) -> Result<Peeked, TokenError> {
        let rest = &self.bytes()[start..];
        for (i, expected) in word.bytes().enumerate() {
            match rest.get(i) {
                Some(&b) if b == expected => {}
                Some(_) => return Err(self.unexpected_at(start + i)),
                None => return Err(TokenError::EndOfInput(start + i)),
            }
        }
        let end = start + word.len();
        if !is_delimiter(self.bytes().get(end).copied()) {
            return Err(self.unexpected_at(end));
        }
        Ok(Peeked { kind, start, end })
    }

    fn scan_number(&self, start: usize) -> Result<Peeked, TokenError> {
        let bytes = self.bytes();
        let digit_at = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);
        let mut i = start;
        if bytes.get(i) == Some(&b'-') {
            i += 1;
            if self.lenient && bytes.get(i) == Some(&b'I') {
                return self.scan_literal(start, "-Infinity", TokenKind::Number);
            }
        }
        match bytes.get(i) {
            Some(b'0') => i += 1,
            Some(b'1'..=b'9') => {
                while digit_at(i) {
                    i += 1;
                }
            }
            None => return Err(TokenError::EndOfInput(i)),
            Some(_) => return Err(TokenError::MalformedNumber(start)),
        }
        if bytes.get(i) == Some(&b'.') {
            i += 1;
            i = expect_digits(bytes, i, start)?;
        }
        if let Some(b'e' | b'E') = bytes.get(i) {
            i += 1;
            if let Some(b'+' | b'-') = bytes.get(i) {
                i += 1;
            }
            i = expect_digits(bytes, i, start)?;
        }
        if !is_delimiter(bytes.get(i).copied()) {
            return Err(TokenError::MalformedNumber(start));
        }
        Ok(Peeked {
            kind: TokenKind::Number,
            start,
            end: i,
        })
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Peeked, TokenError> {
        let peeked = self.fill_peek()?;
        if peeked.kind != kind {
            return Err(TokenError::UnexpectedToken {
                expected: kind,
                found: peeked.kind,
                offset: peeked.start,
            });
        }
        self.peeked = None;
        Ok(peeked)
    }

    /// Reads string content; the cursor sits just past the opening quote.
    fn read_string(&mut self) -> Result<String, TokenError> {
        let mut out = String::new();
        let mut chunk_start = self.pos;
        loop {
            let Some(b) = self.current() else {
                return Err(TokenError::EndOfInput(self.pos));
            };
            match b {
                b'"' => {
                    append(&mut out, &self.input[chunk_start..self.pos])?;
                    self.pos += 1;
                    return Ok(out);
                }
                b'\\' => {
                    append(&mut out, &self.input[chunk_start..self.pos])?;
                    self.pos += 1;
                    self.read_escape(&mut out)?;
                    chunk_start = self.pos;
                }
                0x00..=0x1f => {
                    return Err(TokenError::UnexpectedChar {
                        found: char::from(b),
                        offset: self.pos,
                    })
                }
                _ => self.pos += 1,
            }
        }
    }

    fn read_escape(&mut self, out: &mut String) -> Result<(), TokenError> {
        let offset = self.pos - 1;
        let Some(b) = self.current() else {
            return Err(TokenError::EndOfInput(self.pos));
        };
        self.pos += 1;
        let ch = match b {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => {
                let unit = self.read_hex4()?;
                match unit {
                    0xD800..=0xDBFF => {
                        let bytes = self.bytes();
                        if bytes.get(self.pos) != Some(&b'\\') || bytes.get(self.pos + 1) != Some(&b'u')
                        {
                            return Err(TokenError::InvalidEscape(offset));
                        }
                        self.pos += 2;
                        let low = self.read_hex4()?;
                        if !(0xDC00..=0xDFFF).contains(&low) {
                            return Err(TokenError::InvalidEscape(offset));
                        }
                        let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                        char::from_u32(code).ok_or(TokenError::InvalidEscape(offset))?
                    }
                    0xDC00..=0xDFFF => return Err(TokenError::InvalidEscape(offset)),
                    _ => char::from_u32(unit).ok_or(TokenError::InvalidEscape(offset))?,
                }
            }
            _ => return Err(TokenError::InvalidEscape(offset)),
        };
        append(out, ch.encode_utf8(&mut [0u8; 4]))
    }

    fn read_hex4(&mut self) -> Result<u32, TokenError> {
        let mut unit = 0u32;
        for _ in 0..4 {
            let Some(b) = self.current() else {
                return Err(TokenError::EndOfInput(self.pos));
            };
            let digit = char::from(b)
                .to_digit(16)
                .ok_or(TokenError::InvalidEscape(self.pos))?;
            unit = (unit << 4) | digit;
            self.pos += 1;
        }
        Ok(unit)
    }
}

fn append(out: &mut String, text: &str) -> Result<(), TokenError> {
    out.try_reserve(text.len()).map_err(TokenError::Allocation)?;
    out.push_str(text);
    Ok(())
}

fn is_delimiter(b: Option<u8>) -> bool {
    matches!(
        b,
        None | Some(b' ' | b'\t' | b'\n' | b'\r' | b',' | b']' | b'}' | b':')
    )
}

fn expect_digits(bytes: &[u8], mut i: usize, start: usize) -> Result<usize, TokenError> {
    match bytes.get(i) {
        Some(b) if b.is_ascii_digit() => {}
        None => return Err(TokenError::EndOfInput(i)),
        Some(_) => return Err(TokenError::MalformedNumber(start)),
    }
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    Ok(i)
}

impl TokenSource for TextReader<'_> {
    fn peek(&mut self) -> Result<TokenKind, TokenError> {
        self.fill_peek().map(|peeked| peeked.kind)
    }

    fn begin_array(&mut self) -> Result<(), TokenError> {
        self.stack.try_reserve(1).map_err(TokenError::Allocation)?;
        let peeked = self.expect(TokenKind::BeginArray)?;
        self.pos = peeked.end;
        self.stack.push(Scope::EmptyArray);
        Ok(())
    }

    fn end_array(&mut self) -> Result<(), TokenError> {
        let peeked = self.expect(TokenKind::EndArray)?;
        self.pos = peeked.end;
        self.stack.pop();
        Ok(())
    }

    fn begin_object(&mut self) -> Result<(), TokenError> {
        self.stack.try_reserve(1).map_err(TokenError::Allocation)?;
        let peeked = self.expect(TokenKind::BeginObject)?;
        self.pos = peeked.end;
        self.stack.push(Scope::EmptyObject);
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), TokenError> {
        let peeked = self.expect(TokenKind::EndObject)?;
        self.pos = peeked.end;
        self.stack.pop();
        Ok(())
    }

    fn next_name(&mut self) -> Result<String, TokenError> {
        let peeked = self.expect(TokenKind::Name)?;
        self.pos = peeked.start + 1;
        let name = self.read_string()?;
        self.set_top(Scope::DanglingName);
        Ok(name)
    }

    fn next_string(&mut self) -> Result<String, TokenError> {
        let peeked = self.expect(TokenKind::String)?;
        self.pos = peeked.start + 1;
        self.read_string()
    }

    fn next_number(&mut self) -> Result<String, TokenError> {
        let peeked = self.expect(TokenKind::Number)?;
        self.pos = peeked.end;
        let mut text = String::new();
        append(&mut text, &self.input[peeked.start..peeked.end])?;
        Ok(text)
    }

    fn next_boolean(&mut self) -> Result<bool, TokenError> {
        let peeked = self.expect(TokenKind::Boolean)?;
        self.pos = peeked.end;
        Ok(self.bytes()[peeked.start] == b't')
    }

    fn next_null(&mut self) -> Result<(), TokenError> {
        let peeked = self.expect(TokenKind::Null)?;
        self.pos = peeked.end;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let mut reader = TextReader::new(input);
        let mut out = Vec::new();
        loop {
            let kind = reader.peek().unwrap();
            out.push(kind);
            match kind {
                TokenKind::BeginArray => reader.begin_array().unwrap(),
                TokenKind::EndArray => reader.end_array().unwrap(),
                TokenKind::BeginObject => reader.begin_object().unwrap(),
                TokenKind::EndObject => reader.end_object().unwrap(),
                TokenKind::Name => drop(reader.next_name().unwrap()),
                TokenKind::String => drop(reader.next_string().unwrap()),
                TokenKind::Number => drop(reader.next_number().unwrap()),
                TokenKind::Boolean => drop(reader.next_boolean().unwrap()),
                TokenKind::Null => reader.next_null().unwrap(),
                TokenKind::EndOfDocument => return out,
            }
        }
    }

    #[test]
    fn token_sequence_of_nested_document() {
        use TokenKind::*;
        assert_eq!(
            kinds(r#" {"a": [1, true, null], "b": {"c": "d"}} "#),
            vec![
                BeginObject,
                Name,
                BeginArray,
                Number,
                Boolean,
                Null,
                EndArray,
                Name,
                BeginObject,
                Name,
                String,
                EndObject,
                EndObject,
                EndOfDocument,
            ]
        );
    }

    #[test]
    fn peek_is_idempotent() {
        let mut reader = TextReader::new("[1]");
        assert_eq!(reader.peek().unwrap(), TokenKind::BeginArray);
        assert_eq!(reader.peek().unwrap(), TokenKind::BeginArray);
        reader.begin_array().unwrap();
        assert_eq!(reader.depth(), 1);
        assert!(reader.has_next().unwrap());
        assert_eq!(reader.next_number().unwrap(), "1");
        assert!(!reader.has_next().unwrap());
        reader.end_array().unwrap();
        reader.finish().unwrap();
    }

    #[test]
    fn numbers_keep_their_text() {
        for text in ["0", "-0", "12.50", "1e10", "-3.25E-7", "123456789012345678901234567890"] {
            let mut reader = TextReader::new(text);
            assert_eq!(reader.next_number().unwrap(), text);
        }
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        for text in ["01", "1.", "1.e5", "-", "1e", "+1", "1x"] {
            let mut reader = TextReader::new(text);
            assert!(reader.peek().is_err(), "{text} should not lex");
        }
    }

    #[test]
    fn escapes_and_surrogate_pairs() {
        let mut reader = TextReader::new(r#""a\"b\\c\/\n\t\u00e9\ud83d\ude00""#);
        assert_eq!(reader.next_string().unwrap(), "a\"b\\c/\n\té😀");
    }

    #[test]
    fn lone_surrogates_are_rejected() {
        let mut reader = TextReader::new(r#""\ud83d""#);
        assert_eq!(reader.next_string(), Err(TokenError::InvalidEscape(1)));
        let mut reader = TextReader::new(r#""\ude00""#);
        assert_eq!(reader.next_string(), Err(TokenError::InvalidEscape(1)));
    }

    #[test]
    fn control_characters_in_strings_are_rejected() {
        let mut reader = TextReader::new("\"a\nb\"");
        assert_eq!(
            reader.next_string(),
            Err(TokenError::UnexpectedChar {
                found: '\n',
                offset: 2
            })
        );
    }

    #[test]
    fn non_finite_literals_depend_on_leniency() {
        let mut reader = TextReader::new("[NaN, Infinity, -Infinity]");
        reader.begin_array().unwrap();
        assert_eq!(reader.next_number().unwrap(), "NaN");
        assert_eq!(reader.next_number().unwrap(), "Infinity");
        assert_eq!(reader.next_number().unwrap(), "-Infinity");
        reader.end_array().unwrap();

        let mut strict = TextReader::new("NaN").lenient(false);
        assert!(matches!(
            strict.peek(),
            Err(TokenError::UnexpectedChar { found: 'N', offset: 0 })
        ));
    }

    #[test]
    fn empty_document_is_reported_once() {
        let mut reader = TextReader::new("   ");
        assert_eq!(reader.peek(), Err(TokenError::EmptyDocument));
        assert_eq!(reader.peek(), Ok(TokenKind::EndOfDocument));
    }

    #[test]
    fn trailing_content_is_reported() {
        let mut reader = TextReader::new("1 2");
        reader.next_number().unwrap();
        assert_eq!(reader.peek(), Err(TokenError::TrailingContent(2)));
    }

    #[test]
    fn truncated_documents_report_end_of_input() {
        let mut reader = TextReader::new("[1, tr");
        reader.begin_array().unwrap();
        reader.next_number().unwrap();
        assert_eq!(reader.peek(), Err(TokenError::EndOfInput(6)));
    }

    #[test]
    fn wrong_consumer_reports_unexpected_token() {
        let mut reader = TextReader::new(r#"{"a":1}"#);
        assert_eq!(
            reader.begin_array(),
            Err(TokenError::UnexpectedToken {
                expected: TokenKind::BeginArray,
                found: TokenKind::BeginObject,
                offset: 0
            })
        );
    }

    #[test]
    fn invalid_utf8_is_rejected_up_front() {
        assert_eq!(
            TextReader::from_slice(&[b'"', 0xff, b'"']).err(),
            Some(TokenError::InvalidUtf8)
        );
    }
}
