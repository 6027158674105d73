//! JSON text output.

use std::fmt;

use cson_token::{TextReader, TokenSource};

use crate::config::{self, CsonConfig};
use crate::error::{CsonError, Result};
use crate::number::Number;
use crate::sink::EventSink;
use crate::value::{Primitive, Value};

/// Whitespace layout of written JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatting {
    newline: String,
    indent: String,
    space_after_separators: bool,
}

impl Formatting {
    /// `{"a":[1,2]}`
    pub fn compact() -> Self {
        Self {
            newline: String::new(),
            indent: String::new(),
            space_after_separators: false,
        }
    }

    /// One member or element per line, two-space indent, `"a": 1`.
    pub fn pretty() -> Self {
        Self {
            newline: "\n".to_string(),
            indent: "  ".to_string(),
            space_after_separators: true,
        }
    }

    pub fn with_newline(mut self, newline: impl Into<String>) -> Self {
        self.newline = newline.into();
        self
    }

    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn with_space_after_separators(mut self, space: bool) -> Self {
        self.space_after_separators = space;
        self
    }

    pub fn newline(&self) -> &str {
        &self.newline
    }

    pub fn indent(&self) -> &str {
        &self.indent
    }

    pub fn space_after_separators(&self) -> bool {
        self.space_after_separators
    }
}

impl Default for Formatting {
    fn default() -> Self {
        Self::compact()
    }
}

#[derive(Debug, Clone, Copy)]
struct Scope {
    object: bool,
    empty: bool,
}

/// Event sink that renders JSON text.
///
/// Strict writers (the default) reject NaN, infinities and lazy numbers
/// whose text is not a JSON number. Lenient writers print them verbatim.
#[derive(Debug)]
pub struct TextWriter {
    out: String,
    formatting: Formatting,
    scopes: Vec<Scope>,
    pending_name: bool,
    complete: bool,
    lenient: bool,
}

impl TextWriter {
    pub fn new(formatting: Formatting) -> Self {
        Self {
            out: String::new(),
            formatting,
            scopes: Vec::new(),
            pending_name: false,
            complete: false,
            lenient: false,
        }
    }

    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// The rendered document. Fails while containers are still open.
    pub fn into_string(self) -> Result<String> {
        if !self.scopes.is_empty() {
            return Err(CsonError::IncompleteDocument {
                open: self.scopes.len(),
            });
        }
        Ok(self.out)
    }

    fn newline_indent(&mut self) {
        if self.formatting.newline.is_empty() {
            return;
        }
        self.out.push_str(&self.formatting.newline);
        for _ in 0..self.scopes.len() {
            self.out.push_str(&self.formatting.indent);
        }
    }

    /// Writes the separator owed before the next element or member.
    fn separate(&mut self) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };
        let first = scope.empty;
        scope.empty = false;
        if !first {
            self.out.push(',');
            if self.formatting.space_after_separators && self.formatting.newline.is_empty() {
                self.out.push(' ');
            }
        }
        self.newline_indent();
    }

    fn before_value(&mut self) -> Result<()> {
        if self.pending_name {
            self.pending_name = false;
            return Ok(());
        }
        match self.scopes.last() {
            None if self.complete => Err(CsonError::Structural("document already complete")),
            None => Ok(()),
            Some(scope) if scope.object => {
                Err(CsonError::Structural("object member without a name"))
            }
            Some(_) => {
                self.separate();
                Ok(())
            }
        }
    }

    fn after_value(&mut self) {
        if self.scopes.is_empty() {
            self.complete = true;
        }
    }

    fn begin(&mut self, object: bool) -> Result<()> {
        self.before_value()?;
        self.out.push(if object { '{' } else { '[' });
        self.scopes.push(Scope {
            object,
            empty: true,
        });
        Ok(())
    }

    fn end(&mut self, object: bool) -> Result<()> {
        if self.pending_name {
            return Err(CsonError::Structural("container closed after a dangling name"));
        }
        let scope = match self.scopes.last() {
            None => return Err(CsonError::Structural("no open container to close")),
            Some(scope) if scope.object != object => {
                return Err(CsonError::Structural("closing event does not match the open container"))
            }
            Some(scope) => *scope,
        };
        self.scopes.pop();
        if !scope.empty {
            self.newline_indent();
        }
        self.out.push(if object { '}' } else { ']' });
        self.after_value();
        Ok(())
    }

    fn write_escaped(&mut self, text: &str) -> Result<()> {
        self.out.push_str(&serde_json::to_string(text)?);
        Ok(())
    }

    fn write_number(&mut self, number: &Number) -> Result<()> {
        if !self.lenient {
            match number {
                Number::Float(value) if !value.is_finite() => {
                    return Err(CsonError::NonFiniteNumber(*value))
                }
                Number::Lazy(text) if !is_number_literal(text) => {
                    return Err(CsonError::InvalidNumber(text.clone()))
                }
                _ => {}
            }
        }
        self.out.push_str(&number.to_string());
        Ok(())
    }
}

fn is_number_literal(text: &str) -> bool {
    let mut reader = TextReader::new(text).lenient(false);
    reader.next_number().is_ok() && reader.finish().is_ok()
}

impl EventSink for TextWriter {
    fn begin_array(&mut self) -> Result<()> {
        self.begin(false)
    }

    fn end_array(&mut self) -> Result<()> {
        self.end(false)
    }

    fn begin_object(&mut self) -> Result<()> {
        self.begin(true)
    }

    fn end_object(&mut self) -> Result<()> {
        self.end(true)
    }

    fn name(&mut self, name: &str) -> Result<()> {
        match self.scopes.last() {
            None => return Err(CsonError::Structural("member name outside an object")),
            Some(_) if self.pending_name => {
                return Err(CsonError::Structural("member name already pending"))
            }
            Some(scope) if !scope.object => {
                return Err(CsonError::Structural("member name inside an array"))
            }
            Some(_) => {}
        }
        self.separate();
        self.write_escaped(name)?;
        self.out.push(':');
        if self.formatting.space_after_separators {
            self.out.push(' ');
        }
        self.pending_name = true;
        Ok(())
    }

    fn value(&mut self, value: Primitive) -> Result<()> {
        self.before_value()?;
        match &value {
            Primitive::Bool(flag) => self.out.push_str(if *flag { "true" } else { "false" }),
            Primitive::Number(number) => self.write_number(number)?,
            Primitive::String(text) => self.write_escaped(text)?,
        }
        self.after_value();
        Ok(())
    }

    fn null_value(&mut self) -> Result<()> {
        self.before_value()?;
        self.out.push_str("null");
        self.after_value();
        Ok(())
    }
}

fn render(value: &Value, formatting: Formatting, config: &CsonConfig, lenient: bool) -> Result<String> {
    let mut writer = TextWriter::new(formatting).lenient(lenient);
    value.write_events(&mut writer, &config.canonicalizer)?;
    writer.into_string()
}

/// Strict JSON text using the formatting and ordering of `config`.
pub fn to_string_with(value: &Value, config: &CsonConfig) -> Result<String> {
    render(value, config.formatting.clone(), config, false)
}

/// Strict JSON text using the global configuration.
pub fn to_string(value: &Value) -> Result<String> {
    to_string_with(value, &config::global())
}

/// Strict pretty-printed JSON text in the global canonical order.
pub fn to_string_pretty(value: &Value) -> Result<String> {
    let config = config::global();
    render(value, Formatting::pretty(), &config, false)
}

/// Lenient text in the global configuration; `{:#}` pretty-prints.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = config::global();
        let formatting = if f.alternate() {
            Formatting::pretty()
        } else {
            config.formatting.clone()
        };
        let text = render(self, formatting, &config, true).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}
