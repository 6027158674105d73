//! Event sink that assembles a [`Value`] tree.
//!
//! The writer is a state machine over a stack of open containers and at
//! most one pending member name. Containers are checked for legality when
//! they begin and attached to their parent when they end.

use crate::error::{CsonError, Result};
use crate::sink::EventSink;
use crate::value::tree::Container;
use crate::value::{Array, Object, Primitive, Value};

#[derive(Debug)]
struct Frame {
    container: Container,
    /// Member name the finished container is stored under in its parent.
    name: Option<String>,
}

/// Builds a tree from [`EventSink`] events.
#[derive(Debug)]
pub struct TreeWriter {
    stack: Vec<Frame>,
    pending_name: Option<String>,
    product: Option<Value>,
    closed: bool,
    serialize_nulls: bool,
    lenient: bool,
}

impl TreeWriter {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            pending_name: None,
            product: None,
            closed: false,
            serialize_nulls: true,
            lenient: false,
        }
    }

    /// When off, null members of objects are dropped. Nulls inside arrays
    /// and top-level nulls are always kept.
    pub fn serialize_nulls(mut self, serialize_nulls: bool) -> Self {
        self.serialize_nulls = serialize_nulls;
        self
    }

    /// When off, NaN and infinite numbers are rejected.
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// Number of containers still open.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// `true` once a complete top-level value has been written.
    pub fn is_complete(&self) -> bool {
        self.stack.is_empty() && self.product.is_some()
    }

    /// Rejects every later event. Fails while containers are still open.
    pub fn close(&mut self) -> Result<()> {
        self.ensure_complete()?;
        self.closed = true;
        Ok(())
    }

    /// The assembled tree; `Null` when nothing was written.
    pub fn finish(mut self) -> Result<Value> {
        self.ensure_complete()?;
        Ok(self.product.take().unwrap_or(Value::Null))
    }

    fn ensure_complete(&self) -> Result<()> {
        if self.stack.is_empty() {
            Ok(())
        } else {
            Err(CsonError::IncompleteDocument {
                open: self.stack.len(),
            })
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(CsonError::Structural("writer is closed"))
        } else {
            Ok(())
        }
    }

    /// Checks that a value may be written at the current position.
    fn check_target(&self) -> Result<()> {
        if self.pending_name.is_some() {
            return Ok(());
        }
        match self.stack.last() {
            Some(top) if top.container.is_object() => {
                Err(CsonError::Structural("object member without a name"))
            }
            Some(_) => Ok(()),
            None if self.product.is_some() => {
                Err(CsonError::Structural("document already complete"))
            }
            None => Ok(()),
        }
    }

    fn deposit(&mut self, value: Value) -> Result<()> {
        self.check_target()?;
        let name = self.pending_name.take();
        match self.stack.last_mut() {
            Some(top) => {
                if value.is_null() && name.is_some() && !self.serialize_nulls {
                    return Ok(());
                }
                top.container.deposit(name, value)
            }
            None => {
                self.product = Some(value);
                Ok(())
            }
        }
    }

    fn begin(&mut self, container: Container) -> Result<()> {
        self.ensure_open()?;
        self.check_target()?;
        let name = self.pending_name.take();
        self.stack.push(Frame { container, name });
        Ok(())
    }

    fn end(&mut self, object: bool) -> Result<()> {
        self.ensure_open()?;
        if self.pending_name.is_some() {
            return Err(CsonError::Structural("container closed after a dangling name"));
        }
        match self.stack.last() {
            None => return Err(CsonError::Structural("no open container to close")),
            Some(top) if top.container.is_object() != object => {
                return Err(CsonError::Structural("closing event does not match the open container"))
            }
            Some(_) => {}
        }
        let Some(Frame { container, name }) = self.stack.pop() else {
            return Err(CsonError::Structural("no open container to close"));
        };
        let finished = container.into_value();
        match self.stack.last_mut() {
            Some(parent) => parent.container.deposit(name, finished),
            None => {
                self.product = Some(finished);
                Ok(())
            }
        }
    }
}

impl Default for TreeWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for TreeWriter {
    fn begin_array(&mut self) -> Result<()> {
        self.begin(Container::Array(Array::new()))
    }

    fn end_array(&mut self) -> Result<()> {
        self.end(false)
    }

    fn begin_object(&mut self) -> Result<()> {
        self.begin(Container::Object(Object::new()))
    }

    fn end_object(&mut self) -> Result<()> {
        self.end(true)
    }

    fn name(&mut self, name: &str) -> Result<()> {
        self.ensure_open()?;
        match self.stack.last() {
            None => Err(CsonError::Structural("member name outside an object")),
            Some(_) if self.pending_name.is_some() => {
                Err(CsonError::Structural("member name already pending"))
            }
            Some(top) if !top.container.is_object() => {
                Err(CsonError::Structural("member name inside an array"))
            }
            Some(_) => {
                self.pending_name = Some(name.to_string());
                Ok(())
            }
        }
    }

    fn value(&mut self, value: Primitive) -> Result<()> {
        self.ensure_open()?;
        if let Primitive::Number(number) = &value {
            if !self.lenient && number.is_non_finite() {
                return Err(CsonError::NonFiniteNumber(number.as_f64().unwrap_or(f64::NAN)));
            }
        }
        self.deposit(Value::Primitive(value))
    }

    fn null_value(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.deposit(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nested_document() {
        let mut writer = TreeWriter::new();
        writer.begin_object().unwrap();
        writer.name("a").unwrap();
        writer.begin_array().unwrap();
        writer.number_value(1.into()).unwrap();
        writer.begin_object().unwrap();
        writer.end_object().unwrap();
        writer.end_array().unwrap();
        writer.name("b").unwrap();
        writer.string_value("x").unwrap();
        writer.end_object().unwrap();
        assert!(writer.is_complete());

        let expected = Object::new()
            .with("a", Array::new().with(1).with(Object::new()))
            .with("b", "x");
        assert_eq!(writer.finish().unwrap(), Value::from(expected));
    }

    #[test]
    fn scalar_and_empty_documents() {
        let mut writer = TreeWriter::new();
        writer.bool_value(true).unwrap();
        assert_eq!(writer.finish().unwrap(), Value::from(true));
        assert_eq!(TreeWriter::new().finish().unwrap(), Value::Null);
    }

    #[test]
    fn illegal_events_are_structural_errors() {
        let mut writer = TreeWriter::new();
        assert!(matches!(writer.name("a"), Err(CsonError::Structural(_))));

        writer.begin_array().unwrap();
        assert!(matches!(writer.name("a"), Err(CsonError::Structural(_))));
        assert!(matches!(writer.end_object(), Err(CsonError::Structural(_))));
        writer.end_array().unwrap();
        assert!(matches!(writer.end_array(), Err(CsonError::Structural(_))));
        assert!(matches!(writer.null_value(), Err(CsonError::Structural(_))));

        let mut writer = TreeWriter::new();
        writer.begin_object().unwrap();
        assert!(matches!(writer.bool_value(true), Err(CsonError::Structural(_))));
        assert!(matches!(writer.begin_array(), Err(CsonError::Structural(_))));
        writer.name("k").unwrap();
        assert!(matches!(writer.name("k2"), Err(CsonError::Structural(_))));
        assert!(matches!(writer.end_object(), Err(CsonError::Structural(_))));
    }

    #[test]
    fn finishing_with_open_frames_fails() {
        let mut writer = TreeWriter::new();
        writer.begin_array().unwrap();
        writer.begin_object().unwrap();
        assert!(matches!(
            writer.close(),
            Err(CsonError::IncompleteDocument { open: 2 })
        ));
        assert!(matches!(
            writer.finish(),
            Err(CsonError::IncompleteDocument { open: 2 })
        ));
    }

    #[test]
    fn closed_writer_rejects_events() {
        let mut writer = TreeWriter::new();
        writer.string_value("done").unwrap();
        writer.close().unwrap();
        assert!(matches!(
            writer.begin_array(),
            Err(CsonError::Structural("writer is closed"))
        ));
        assert_eq!(writer.finish().unwrap(), Value::from("done"));
    }

    #[test]
    fn null_members_follow_policy() {
        let mut writer = TreeWriter::new().serialize_nulls(false);
        writer.begin_object().unwrap();
        writer.name("dropped").unwrap();
        writer.null_value().unwrap();
        writer.name("list").unwrap();
        writer.begin_array().unwrap();
        writer.null_value().unwrap();
        writer.end_array().unwrap();
        writer.end_object().unwrap();
        let value = writer.finish().unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("dropped"));
        assert_eq!(object.get("list"), Some(&Value::from(vec![Value::Null])));

        let mut writer = TreeWriter::new();
        writer.begin_object().unwrap();
        writer.name("kept").unwrap();
        writer.null_value().unwrap();
        writer.end_object().unwrap();
        assert!(writer.finish().unwrap().as_object().unwrap().contains_key("kept"));
    }

    #[test]
    fn non_finite_numbers_need_leniency() {
        let mut writer = TreeWriter::new();
        assert!(matches!(
            writer.number_value(f64::NAN.into()),
            Err(CsonError::NonFiniteNumber(_))
        ));
        let mut writer = TreeWriter::new().lenient(true);
        writer.number_value(f64::INFINITY.into()).unwrap();
        assert_eq!(writer.finish().unwrap(), Value::from(f64::INFINITY));
    }

    #[test]
    fn duplicate_names_replace_in_place() {
        let mut writer = TreeWriter::new();
        writer.begin_object().unwrap();
        for (name, value) in [("a", 1), ("b", 2), ("a", 3)] {
            writer.name(name).unwrap();
            writer.number_value(value.into()).unwrap();
        }
        writer.end_object().unwrap();
        let value = writer.finish().unwrap();
        let object = value.as_object().unwrap();
        let keys: Vec<&String> = object.keys().collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(object.get("a"), Some(&Value::from(3)));
    }
}
