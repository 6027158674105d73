//! Glue between serde and the event interface.
//!
//! [`EventSerializer`] turns any `Serialize` type into [`EventSink`] events:
//!
//! - unit, unit structs and `None` become null
//! - unit variants become their name as a string
//! - newtype structs become the inner value
//! - newtype, tuple and struct variants become an object with one member
//!   named after the variant
//! - sequences, tuples and byte strings become arrays
//! - maps and structs become objects; map keys must be strings, chars,
//!   booleans or numbers and are written in their textual form
//!
//! `Value` serializes itself in the order of the global canonicalizer.
//! Integral numbers are written exactly at the narrowest serde width that
//! holds them, and integers wider than 128 bits fail. Fractional numbers
//! are written as `f64`.

use serde::ser::{
    self, Impossible, Serialize, SerializeMap, SerializeSeq, SerializeStruct,
    SerializeStructVariant, SerializeTuple, SerializeTupleStruct, SerializeTupleVariant,
    Serializer,
};

use crate::canonical::Canonicalizer;
use crate::config;
use crate::error::{CsonError, Result};
use crate::number::{Number, Wire};
use crate::sink::EventSink;
use crate::value::{Primitive, Value};
use crate::writer::TreeWriter;

/// Deepest container nesting the serde bridges accept.
///
/// serde nests by recursion; deeper trees fail with
/// [`CsonError::DepthLimit`] instead of exhausting the stack.
pub const MAX_DEPTH: usize = 256;

/// Serializes a value into a tree.
///
/// NaN and infinities are kept, since a tree can hold them.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    let mut serializer = EventSerializer::new(TreeWriter::new().lenient(true));
    value.serialize(&mut serializer)?;
    serializer.into_inner().finish()
}

/// A serde `Serializer` feeding an [`EventSink`].
#[derive(Debug)]
pub struct EventSerializer<S> {
    sink: S,
}

impl<S: EventSink> EventSerializer<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_inner(self) -> S {
        self.sink
    }
}

impl<'a, S: EventSink> Serializer for &'a mut EventSerializer<S> {
    type Ok = ();
    type Error = CsonError;
    type SerializeSeq = Compound<'a, S>;
    type SerializeTuple = Compound<'a, S>;
    type SerializeTupleStruct = Compound<'a, S>;
    type SerializeTupleVariant = Compound<'a, S>;
    type SerializeMap = Compound<'a, S>;
    type SerializeStruct = Compound<'a, S>;
    type SerializeStructVariant = Compound<'a, S>;

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.sink.bool_value(v)
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.sink.number_value(v.into())
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.sink.number_value(v.into())
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.sink.number_value(v.into())
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        self.sink.number_value(v.into())
    }

    fn serialize_i128(self, v: i128) -> Result<()> {
        self.sink.number_value(v.into())
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.sink.number_value(v.into())
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.sink.number_value(v.into())
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.sink.number_value(v.into())
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        self.sink.number_value(v.into())
    }

    fn serialize_u128(self, v: u128) -> Result<()> {
        self.sink.number_value(v.into())
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        self.sink.number_value(v.into())
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        self.sink.number_value(v.into())
    }

    fn serialize_char(self, v: char) -> Result<()> {
        self.sink.value(Primitive::from(v))
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.sink.string_value(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        self.sink.begin_array()?;
        for byte in v {
            self.sink.number_value((*byte).into())?;
        }
        self.sink.end_array()
    }

    fn serialize_none(self) -> Result<()> {
        self.sink.null_value()
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.sink.null_value()
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.sink.null_value()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.sink.string_value(variant)
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.sink.begin_object()?;
        self.sink.name(variant)?;
        value.serialize(&mut *self)?;
        self.sink.end_object()
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Compound<'a, S>> {
        self.sink.begin_array()?;
        Ok(Compound::new(self, false, false))
    }

    fn serialize_tuple(self, len: usize) -> Result<Compound<'a, S>> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<Compound<'a, S>> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Compound<'a, S>> {
        self.sink.begin_object()?;
        self.sink.name(variant)?;
        self.sink.begin_array()?;
        Ok(Compound::new(self, false, true))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Compound<'a, S>> {
        self.sink.begin_object()?;
        Ok(Compound::new(self, true, false))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Compound<'a, S>> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Compound<'a, S>> {
        self.sink.begin_object()?;
        self.sink.name(variant)?;
        self.sink.begin_object()?;
        Ok(Compound::new(self, true, true))
    }
}

/// An open array or object, optionally wrapped in a variant object.
#[derive(Debug)]
pub struct Compound<'a, S> {
    ser: &'a mut EventSerializer<S>,
    object: bool,
    variant: bool,
}

impl<'a, S: EventSink> Compound<'a, S> {
    fn new(ser: &'a mut EventSerializer<S>, object: bool, variant: bool) -> Self {
        Self {
            ser,
            object,
            variant,
        }
    }

    fn element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut *self.ser)
    }

    fn field<T: ?Sized + Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        self.ser.sink.name(key)?;
        value.serialize(&mut *self.ser)
    }

    fn finish(self) -> Result<()> {
        if self.object {
            self.ser.sink.end_object()?;
        } else {
            self.ser.sink.end_array()?;
        }
        if self.variant {
            self.ser.sink.end_object()?;
        }
        Ok(())
    }
}

impl<S: EventSink> SerializeSeq for Compound<'_, S> {
    type Ok = ();
    type Error = CsonError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<S: EventSink> SerializeTuple for Compound<'_, S> {
    type Ok = ();
    type Error = CsonError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<S: EventSink> SerializeTupleStruct for Compound<'_, S> {
    type Ok = ();
    type Error = CsonError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<S: EventSink> SerializeTupleVariant for Compound<'_, S> {
    type Ok = ();
    type Error = CsonError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<S: EventSink> SerializeMap for Compound<'_, S> {
    type Ok = ();
    type Error = CsonError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = key.serialize(MapKeySerializer)?;
        self.ser.sink.name(&key)
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<S: EventSink> SerializeStruct for Compound<'_, S> {
    type Ok = ();
    type Error = CsonError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<S: EventSink> SerializeStructVariant for Compound<'_, S> {
    type Ok = ();
    type Error = CsonError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

/// Renders a map key as a member name.
struct MapKeySerializer;

fn key_must_be_scalar() -> CsonError {
    CsonError::Custom("map key must be a string, char, boolean or number".to_string())
}

impl Serializer for MapKeySerializer {
    type Ok = String;
    type Error = CsonError;
    type SerializeSeq = Impossible<String, CsonError>;
    type SerializeTuple = Impossible<String, CsonError>;
    type SerializeTupleStruct = Impossible<String, CsonError>;
    type SerializeTupleVariant = Impossible<String, CsonError>;
    type SerializeMap = Impossible<String, CsonError>;
    type SerializeStruct = Impossible<String, CsonError>;
    type SerializeStructVariant = Impossible<String, CsonError>;

    fn serialize_bool(self, v: bool) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i8(self, v: i8) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i16(self, v: i16) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i32(self, v: i32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i64(self, v: i64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i128(self, v: i128) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u8(self, v: u8) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u16(self, v: u16) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u32(self, v: u32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u64(self, v: u64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u128(self, v: u128) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_f32(self, v: f32) -> Result<String> {
        Ok(Number::from(v).to_string())
    }

    fn serialize_f64(self, v: f64) -> Result<String> {
        Ok(Number::from(v).to_string())
    }

    fn serialize_char(self, v: char) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String> {
        Err(key_must_be_scalar())
    }

    fn serialize_none(self) -> Result<String> {
        Err(key_must_be_scalar())
    }

    fn serialize_some<T>(self, value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<String> {
        Err(key_must_be_scalar())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String> {
        Err(key_must_be_scalar())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        Err(key_must_be_scalar())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(key_must_be_scalar())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(key_must_be_scalar())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(key_must_be_scalar())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(key_must_be_scalar())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(key_must_be_scalar())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(key_must_be_scalar())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(key_must_be_scalar())
    }
}

impl Serialize for Value {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> std::result::Result<Ser::Ok, Ser::Error> {
        let canonicalizer = config::global().canonicalizer;
        Canonical {
            value: self,
            canonicalizer: &canonicalizer,
            depth: 0,
        }
        .serialize(serializer)
    }
}

struct Canonical<'a> {
    value: &'a Value,
    canonicalizer: &'a Canonicalizer,
    depth: usize,
}

impl<'a> Canonical<'a> {
    fn child(&self, value: &'a Value) -> Self {
        Canonical {
            value,
            canonicalizer: self.canonicalizer,
            depth: self.depth + 1,
        }
    }
}

impl Serialize for Canonical<'_> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> std::result::Result<Ser::Ok, Ser::Error> {
        if self.value.is_container() && self.depth >= MAX_DEPTH {
            return Err(fail(CsonError::DepthLimit { limit: MAX_DEPTH }));
        }
        match self.value {
            Value::Null => serializer.serialize_unit(),
            Value::Primitive(Primitive::Bool(flag)) => serializer.serialize_bool(*flag),
            Value::Primitive(Primitive::String(text)) => serializer.serialize_str(text),
            Value::Primitive(Primitive::Number(number)) => serialize_number(number, serializer),
            Value::Array(array) => {
                let mut seq = serializer.serialize_seq(Some(array.len()))?;
                for element in self.canonicalizer.elements(array) {
                    seq.serialize_element(&self.child(element))?;
                }
                seq.end()
            }
            Value::Object(object) => {
                let mut map = serializer.serialize_map(Some(object.len()))?;
                for (key, value) in self.canonicalizer.members(object) {
                    map.serialize_entry(key, &self.child(value))?;
                }
                map.end()
            }
        }
    }
}

fn fail<E: ser::Error>(error: CsonError) -> E {
    E::custom(error)
}

fn serialize_number<Ser: Serializer>(
    number: &Number,
    serializer: Ser,
) -> std::result::Result<Ser::Ok, Ser::Error> {
    match number.wire().map_err(fail::<Ser::Error>)? {
        Wire::Signed(value) => serializer.serialize_i64(value),
        Wire::Unsigned(value) => serializer.serialize_u64(value),
        Wire::WideSigned(value) => serializer.serialize_i128(value),
        Wire::WideUnsigned(value) => serializer.serialize_u128(value),
        Wire::Float(value) => serializer.serialize_f64(value),
        Wire::Oversized => Err(fail(CsonError::NumberOutOfRange(number.to_string()))),
    }
}
