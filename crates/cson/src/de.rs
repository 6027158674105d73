//! Reading trees through serde.
//!
//! `Value` deserializes from any self-describing format, and [`from_value`]
//! extracts any `Deserialize` type from a tree. The mapping mirrors
//! [`crate::ser`]:
//!
//! - null is unit and `None`
//! - a string names a unit variant; an object with one member holds any
//!   other variant under its name
//! - member names stand in for map keys of any scalar type
//!
//! Numbers are visited at the narrowest exact width, the same one the
//! serializer picks. Nesting is bounded by [`MAX_DEPTH`].

use std::fmt;

use serde::de::value::StrDeserializer;
use serde::de::{
    self, DeserializeSeed, Deserializer, EnumAccess, IntoDeserializer, MapAccess, SeqAccess,
    VariantAccess, Visitor,
};
use serde::{forward_to_deserialize_any, Deserialize};

use crate::error::{CsonError, Result};
use crate::number::Wire;
use crate::ser::MAX_DEPTH;
use crate::value::{Array, Object, Primitive, Value};

/// Deserializes a `T` from a tree. Strings may be borrowed from `value`.
pub fn from_value<'de, T: Deserialize<'de>>(value: &'de Value) -> Result<T> {
    T::deserialize(ValueDeserializer::new(value))
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> std::result::Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> std::result::Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> std::result::Result<Value, E> {
        Ok(Value::from(v.iter().copied().collect::<Array>()))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> std::result::Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Value, A::Error> {
        let mut array = Array::with_capacity(seq.size_hint().unwrap_or(0).min(1024));
        while let Some(element) = seq.next_element::<Value>()? {
            array.push(element);
        }
        Ok(Value::from(array))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Value, A::Error> {
        let mut object = Object::new();
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            object.insert(key, value);
        }
        Ok(Value::from(object))
    }
}

/// A serde `Deserializer` reading from a borrowed tree.
#[derive(Debug, Clone, Copy)]
pub struct ValueDeserializer<'de> {
    value: &'de Value,
    depth: usize,
}

impl<'de> ValueDeserializer<'de> {
    pub fn new(value: &'de Value) -> Self {
        Self { value, depth: 0 }
    }

    fn child(&self, value: &'de Value) -> Self {
        Self {
            value,
            depth: self.depth + 1,
        }
    }

    fn enter(&self) -> Result<()> {
        if self.depth >= MAX_DEPTH {
            return Err(CsonError::DepthLimit { limit: MAX_DEPTH });
        }
        Ok(())
    }
}

impl<'de> Deserializer<'de> for ValueDeserializer<'de> {
    type Error = CsonError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Primitive(Primitive::Bool(flag)) => visitor.visit_bool(*flag),
            Value::Primitive(Primitive::String(text)) => visitor.visit_borrowed_str(text),
            Value::Primitive(Primitive::Number(number)) => match number.wire()? {
                Wire::Signed(value) => visitor.visit_i64(value),
                Wire::Unsigned(value) => visitor.visit_u64(value),
                Wire::WideSigned(value) => visitor.visit_i128(value),
                Wire::WideUnsigned(value) => visitor.visit_u128(value),
                Wire::Float(value) => visitor.visit_f64(value),
                Wire::Oversized => Err(CsonError::NumberOutOfRange(number.to_string())),
            },
            Value::Array(array) => {
                self.enter()?;
                let mut access = ArrayAccess {
                    parent: self,
                    elements: array.iter(),
                };
                let value = visitor.visit_seq(&mut access)?;
                if access.elements.next().is_some() {
                    return Err(de::Error::invalid_length(
                        array.len(),
                        &"fewer elements in array",
                    ));
                }
                Ok(value)
            }
            Value::Object(object) => {
                self.enter()?;
                let mut access = ObjectAccess {
                    parent: self,
                    members: object.iter(),
                    pending: None,
                };
                let value = visitor.visit_map(&mut access)?;
                if access.members.next().is_some() {
                    return Err(de::Error::invalid_length(
                        object.len(),
                        &"fewer members in object",
                    ));
                }
                Ok(value)
            }
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self.value {
            Value::Primitive(Primitive::String(variant)) => {
                let access: StrDeserializer<'_, CsonError> = variant.as_str().into_deserializer();
                visitor.visit_enum(access)
            }
            Value::Object(object) => {
                self.enter()?;
                let mut members = object.iter();
                match (members.next(), members.next()) {
                    (Some((variant, payload)), None) => visitor.visit_enum(Variant {
                        name: variant,
                        payload: self.child(payload),
                    }),
                    _ => Err(CsonError::InvalidState(format!(
                        "enum object must have exactly one member, but has {}",
                        object.len()
                    ))),
                }
            }
            other => Err(other.mismatch("string or object")),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

struct ArrayAccess<'de> {
    parent: ValueDeserializer<'de>,
    elements: std::slice::Iter<'de, Value>,
}

impl<'de> SeqAccess<'de> for ArrayAccess<'de> {
    type Error = CsonError;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        match self.elements.next() {
            Some(element) => seed.deserialize(self.parent.child(element)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.elements.len())
    }
}

struct ObjectAccess<'de> {
    parent: ValueDeserializer<'de>,
    members: indexmap::map::Iter<'de, String, Value>,
    pending: Option<&'de Value>,
}

impl<'de> MapAccess<'de> for ObjectAccess<'de> {
    type Error = CsonError;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        match self.members.next() {
            Some((name, value)) => {
                self.pending = Some(value);
                seed.deserialize(MemberName(name)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        match self.pending.take() {
            Some(value) => seed.deserialize(self.parent.child(value)),
            None => Err(CsonError::InvalidState(
                "member value requested before its name".to_string(),
            )),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.members.len())
    }
}

struct Variant<'de> {
    name: &'de str,
    payload: ValueDeserializer<'de>,
}

impl<'de> EnumAccess<'de> for Variant<'de> {
    type Error = CsonError;
    type Variant = ValueDeserializer<'de>;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self::Variant)> {
        let variant = seed.deserialize(MemberName(self.name))?;
        Ok((variant, self.payload))
    }
}

impl<'de> VariantAccess<'de> for ValueDeserializer<'de> {
    type Error = CsonError;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Value::Null => Ok(()),
            other => Err(other.mismatch("null")),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        seed.deserialize(self)
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        self.deserialize_any(visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_any(visitor)
    }
}

/// A member name read back as a map key, parsing the textual form the
/// serializer gives boolean and numeric keys.
struct MemberName<'de>(&'de str);

macro_rules! parse_name {
    ($($method:ident => $visit:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
                match self.0.parse::<$ty>() {
                    Ok(parsed) => visitor.$visit(parsed),
                    Err(_) => Err(CsonError::conversion(stringify!($ty), self.0)),
                }
            }
        )*
    };
}

impl<'de> Deserializer<'de> for MemberName<'de> {
    type Error = CsonError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_borrowed_str(self.0)
    }

    parse_name! {
        deserialize_bool => visit_bool: bool,
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_i128 => visit_i128: i128,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
        deserialize_u128 => visit_u128: u128,
        deserialize_f32 => visit_f32: f32,
        deserialize_f64 => visit_f64: f64,
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        let access: StrDeserializer<'_, CsonError> = self.0.into_deserializer();
        visitor.visit_enum(access)
    }

    forward_to_deserialize_any! {
        char str string bytes byte_buf unit unit_struct seq tuple tuple_struct
        map struct identifier ignored_any
    }
}
