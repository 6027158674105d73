//! The JSON document tree.

mod array;
mod emit;
mod object;
mod primitive;
pub(crate) mod tree;

use std::hash::{Hash, Hasher};

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::error::{CsonError, Result};
use crate::number::Number;

pub use array::Array;
pub use object::Object;
pub use primitive::Primitive;

/// A JSON value. Containers exclusively own their children.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Primitive(Primitive),
    Array(Array),
    Object(Object),
}

impl Value {
    /// A number whose text is validated on first numeric access.
    pub fn lazy_number(text: impl Into<String>) -> Self {
        Value::Primitive(Primitive::Number(Number::lazy(text)))
    }

    /// `"null"`, `"boolean"`, `"number"`, `"string"`, `"array"` or `"object"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Primitive(primitive) => primitive.kind(),
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Value::Primitive(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Object(_))
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Value::Primitive(primitive) if primitive.is_boolean())
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Primitive(primitive) if primitive.is_number())
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::Primitive(primitive) if primitive.is_string())
    }

    pub fn as_null(&self) -> Result<()> {
        match self {
            Value::Null => Ok(()),
            other => Err(other.mismatch("null")),
        }
    }

    pub fn as_primitive(&self) -> Result<&Primitive> {
        match self {
            Value::Primitive(primitive) => Ok(primitive),
            other => Err(other.mismatch("primitive")),
        }
    }

    pub fn as_array(&self) -> Result<&Array> {
        match self {
            Value::Array(array) => Ok(array),
            other => Err(other.mismatch("array")),
        }
    }

    pub fn as_object(&self) -> Result<&Object> {
        match self {
            Value::Object(object) => Ok(object),
            other => Err(other.mismatch("object")),
        }
    }

    pub fn as_primitive_mut(&mut self) -> Result<&mut Primitive> {
        match self {
            Value::Primitive(primitive) => Ok(primitive),
            other => Err(other.mismatch("primitive")),
        }
    }

    pub fn as_array_mut(&mut self) -> Result<&mut Array> {
        match self {
            Value::Array(array) => Ok(array),
            other => Err(other.mismatch("array")),
        }
    }

    pub fn as_object_mut(&mut self) -> Result<&mut Object> {
        match self {
            Value::Object(object) => Ok(object),
            other => Err(other.mismatch("object")),
        }
    }

    /// Member lookup that is `None` for non-objects.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(object) => object.get(key),
            _ => None,
        }
    }

    /// A structurally identical, fully independent tree.
    pub fn deep_copy(&self) -> Value {
        tree::copy_value(self)
    }

    /// Replaces `self` with `Null`, returning the previous value.
    pub fn take(&mut self) -> Value {
        std::mem::take(self)
    }

    pub(crate) fn mismatch(&self, expected: &'static str) -> CsonError {
        CsonError::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        tree::all_equal(vec![(self, other)])
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        tree::hash_all(vec![self], state);
    }
}

impl From<Primitive> for Value {
    fn from(value: Primitive) -> Self {
        Value::Primitive(value)
    }
}

impl From<Array> for Value {
    fn from(value: Array) -> Self {
        Value::Array(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Value::Object(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Array(Array::from(values))
    }
}

macro_rules! from_scalar {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Primitive(Primitive::from(value))
                }
            }
        )*
    };
}

from_scalar!(
    bool, char, String, &str, Number, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128,
    usize, f32, f64, BigInt, BigDecimal
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_and_predicates() {
        assert_eq!(Value::Null.kind(), "null");
        assert_eq!(Value::from(true).kind(), "boolean");
        assert_eq!(Value::lazy_number("1").kind(), "number");
        assert_eq!(Value::from("s").kind(), "string");
        assert!(Value::from(Array::new()).is_array());
        assert!(Value::from(Object::new()).is_object());
        assert!(Value::from(1).is_number());
        assert!(!Value::from("1").is_number());
        assert!(Value::from(None::<i32>).is_null());
    }

    #[test]
    fn narrowing_reports_type_mismatch() {
        let value = Value::from(1);
        assert!(value.as_primitive().is_ok());
        assert!(matches!(
            value.as_object(),
            Err(CsonError::TypeMismatch {
                expected: "object",
                found: "number"
            })
        ));
        assert!(Value::Null.as_null().is_ok());
        assert!(Value::from(Array::new()).as_null().is_err());
    }

    #[test]
    fn deep_copy_is_independent() {
        let original = Value::from(
            Object::new()
                .with("list", Array::new().with(1).with(Object::new().with("k", "v")))
                .with("n", Value::Null),
        );
        let mut copy = original.deep_copy();
        assert_eq!(copy, original);
        copy.as_object_mut()
            .unwrap()
            .get_mut("list")
            .unwrap()
            .as_array_mut()
            .unwrap()
            .push(2);
        assert_ne!(copy, original);
        assert_eq!(
            original.get("list").unwrap().as_array().unwrap().len(),
            2
        );
    }

    #[test]
    fn deep_trees_compare_clone_and_drop_without_recursion() {
        let depth = 100_000;
        let mut value = Value::from(1);
        for _ in 0..depth {
            value = Value::from(Array::new().with(value));
        }
        let copy = value.clone();
        assert_eq!(copy, value);
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        copy.hash(&mut hasher);
        drop(copy);
        drop(value);
    }

    #[test]
    fn null_is_distinct_from_everything_else() {
        assert_eq!(Value::Null, Value::Null);
        assert_ne!(Value::Null, Value::from(0));
        assert_ne!(Value::Null, Value::from(Array::new()));
    }
}
