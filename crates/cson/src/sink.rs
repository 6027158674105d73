//! Structural event interface shared by every writer.

use crate::error::Result;
use crate::number::Number;
use crate::value::Primitive;

/// Receiver of a JSON document as a flat sequence of structural events.
///
/// Implementations decide which sequences are legal and report violations
/// as [`CsonError::Structural`](crate::CsonError::Structural).
pub trait EventSink {
    fn begin_array(&mut self) -> Result<()>;
    fn end_array(&mut self) -> Result<()>;
    fn begin_object(&mut self) -> Result<()>;
    fn end_object(&mut self) -> Result<()>;
    /// Names the next value inside an object.
    fn name(&mut self, name: &str) -> Result<()>;
    fn value(&mut self, value: Primitive) -> Result<()>;
    fn null_value(&mut self) -> Result<()>;

    fn bool_value(&mut self, value: bool) -> Result<()> {
        self.value(Primitive::Bool(value))
    }

    fn string_value(&mut self, value: &str) -> Result<()> {
        self.value(Primitive::String(value.to_string()))
    }

    fn number_value(&mut self, value: Number) -> Result<()> {
        self.value(Primitive::Number(value))
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn begin_array(&mut self) -> Result<()> {
        (**self).begin_array()
    }

    fn end_array(&mut self) -> Result<()> {
        (**self).end_array()
    }

    fn begin_object(&mut self) -> Result<()> {
        (**self).begin_object()
    }

    fn end_object(&mut self) -> Result<()> {
        (**self).end_object()
    }

    fn name(&mut self, name: &str) -> Result<()> {
        (**self).name(name)
    }

    fn value(&mut self, value: Primitive) -> Result<()> {
        (**self).value(value)
    }

    fn null_value(&mut self) -> Result<()> {
        (**self).null_value()
    }
}
