//! Typed accessors on values and objects.
//!
//! For every scalar kind there is a bare form on [`Value`] (`as_i32`), a
//! defaulted bare form (`as_i32_or`) and three keyed forms on [`Object`]
//! and [`Value`]: required (`get_i32`), defaulted when absent
//! (`get_i32_or`) and optional (`get_i32_opt`).

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::error::Result;
use crate::number::Number;
use crate::value::{Array, Object, Primitive, Value};

impl Value {
    /// The primitive behind a bare value or a chain of single-element
    /// arrays.
    fn scalar(&self) -> Result<&Primitive> {
        let mut current = self;
        loop {
            match current {
                Value::Primitive(primitive) => return Ok(primitive),
                Value::Array(array) => current = array.single()?,
                other => return Err(other.mismatch("primitive")),
            }
        }
    }

    pub fn as_char_at(&self, index: usize) -> Result<char> {
        self.scalar()?.as_char_at(index)
    }

    pub fn as_char_at_or(&self, index: usize, default: char) -> Result<char> {
        match self {
            Value::Primitive(primitive) if primitive.is_string() => primitive.as_char_at(index),
            _ => Ok(default),
        }
    }

    pub fn get_char_at(&self, key: &str, index: usize) -> Result<char> {
        self.as_object()?.get_char_at(key, index)
    }

    pub fn get_char_at_or(&self, key: &str, index: usize, default: char) -> Result<char> {
        self.as_object()?.get_char_at_or(key, index, default)
    }
}

impl Object {
    pub fn get_char_at(&self, key: &str, index: usize) -> Result<char> {
        self.member(key)?.as_char_at(index)
    }

    pub fn get_char_at_or(&self, key: &str, index: usize, default: char) -> Result<char> {
        match self.get(key) {
            Some(value) => value.as_char_at(index),
            None => Ok(default),
        }
    }
}

macro_rules! scalar_accessors {
    ($(($as_fn:ident, $as_or:ident, $get:ident, $get_or:ident, $get_opt:ident, $ty:ty, $is:ident)),* $(,)?) => {
        impl Value {
            $(
                pub fn $as_fn(&self) -> Result<$ty> {
                    self.scalar()?.$as_fn()
                }

                pub fn $as_or(&self, default: $ty) -> Result<$ty> {
                    match self {
                        Value::Primitive(primitive) if primitive.$is() => primitive.$as_fn(),
                        _ => Ok(default),
                    }
                }

                pub fn $get(&self, key: &str) -> Result<$ty> {
                    self.as_object()?.$get(key)
                }

                pub fn $get_or(&self, key: &str, default: $ty) -> Result<$ty> {
                    self.as_object()?.$get_or(key, default)
                }

                pub fn $get_opt(&self, key: &str) -> Result<Option<$ty>> {
                    self.as_object()?.$get_opt(key)
                }
            )*
        }

        impl Object {
            $(
                pub fn $get(&self, key: &str) -> Result<$ty> {
                    self.member(key)?.$as_fn()
                }

                pub fn $get_or(&self, key: &str, default: $ty) -> Result<$ty> {
                    match self.get(key) {
                        Some(value) => value.$as_fn(),
                        None => Ok(default),
                    }
                }

                pub fn $get_opt(&self, key: &str) -> Result<Option<$ty>> {
                    self.get(key).map(Value::$as_fn).transpose()
                }
            )*
        }
    };
}

scalar_accessors!(
    (as_bool, as_bool_or, get_bool, get_bool_or, get_bool_opt, bool, is_boolean),
    (as_string, as_string_or, get_string, get_string_or, get_string_opt, String, is_string),
    (as_char, as_char_or, get_char, get_char_or, get_char_opt, char, is_string),
    (as_number, as_number_or, get_number, get_number_or, get_number_opt, Number, is_number),
    (as_i8, as_i8_or, get_i8, get_i8_or, get_i8_opt, i8, is_number),
    (as_i16, as_i16_or, get_i16, get_i16_or, get_i16_opt, i16, is_number),
    (as_i32, as_i32_or, get_i32, get_i32_or, get_i32_opt, i32, is_number),
    (as_i64, as_i64_or, get_i64, get_i64_or, get_i64_opt, i64, is_number),
    (as_f32, as_f32_or, get_f32, get_f32_or, get_f32_opt, f32, is_number),
    (as_f64, as_f64_or, get_f64, get_f64_or, get_f64_opt, f64, is_number),
    (as_big_integer, as_big_integer_or, get_big_integer, get_big_integer_or, get_big_integer_opt, BigInt, is_number),
    (as_big_decimal, as_big_decimal_or, get_big_decimal, get_big_decimal_or, get_big_decimal_opt, BigDecimal, is_number),
);

macro_rules! container_accessors {
    ($(($get:ident, $get_or:ident, $get_opt:ident, $narrow:ident, $ty:ty)),* $(,)?) => {
        impl Object {
            $(
                pub fn $get(&self, key: &str) -> Result<&$ty> {
                    self.member(key)?.$narrow()
                }

                pub fn $get_or<'a>(&'a self, key: &str, default: &'a $ty) -> Result<&'a $ty> {
                    match self.get(key) {
                        Some(value) => value.$narrow(),
                        None => Ok(default),
                    }
                }

                pub fn $get_opt(&self, key: &str) -> Result<Option<&$ty>> {
                    self.get(key).map(Value::$narrow).transpose()
                }
            )*
        }

        impl Value {
            $(
                pub fn $get(&self, key: &str) -> Result<&$ty> {
                    self.as_object()?.$get(key)
                }

                pub fn $get_or<'a>(&'a self, key: &str, default: &'a $ty) -> Result<&'a $ty> {
                    self.as_object()?.$get_or(key, default)
                }

                pub fn $get_opt(&self, key: &str) -> Result<Option<&$ty>> {
                    self.as_object()?.$get_opt(key)
                }
            )*
        }
    };
}

container_accessors!(
    (get_object, get_object_or, get_object_opt, as_object, Object),
    (get_array, get_array_or, get_array_opt, as_array, Array),
    (get_primitive, get_primitive_or, get_primitive_opt, as_primitive, Primitive),
);

impl Object {
    /// Requires `key` to be present and null.
    pub fn get_null(&self, key: &str) -> Result<()> {
        self.member(key)?.as_null()
    }

    /// `Ok(false)` when `key` is absent, `Ok(true)` when it holds null.
    pub fn get_null_opt(&self, key: &str) -> Result<bool> {
        match self.get(key) {
            Some(value) => value.as_null().map(|()| true),
            None => Ok(false),
        }
    }
}

impl Value {
    pub fn get_null(&self, key: &str) -> Result<()> {
        self.as_object()?.get_null(key)
    }

    pub fn get_null_opt(&self, key: &str) -> Result<bool> {
        self.as_object()?.get_null_opt(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CsonError;

    fn sample() -> Object {
        Object::new()
            .with("n", 42)
            .with("s", "7")
            .with("word", "hello")
            .with("flag", true)
            .with("one", Array::new().with(3.5))
            .with("nested", Object::new().with("k", "v"))
            .with("nothing", Value::Null)
    }

    #[test]
    fn required_keys() {
        let object = sample();
        assert_eq!(object.get_i32("n").unwrap(), 42);
        assert_eq!(object.get_i32("s").unwrap(), 7);
        assert_eq!(object.get_string("n").unwrap(), "42");
        assert!(object.get_bool("flag").unwrap());
        assert_eq!(object.get_f64("one").unwrap(), 3.5);
        assert!(matches!(
            object.get_i32("missing"),
            Err(CsonError::MissingKey(key)) if key == "missing"
        ));
        assert!(matches!(
            object.get_i32("word"),
            Err(CsonError::Conversion { target: "i32", .. })
        ));
    }

    #[test]
    fn defaults_apply_only_when_absent() {
        let object = sample();
        assert_eq!(object.get_i32_or("missing", -1).unwrap(), -1);
        assert_eq!(object.get_i32_or("n", -1).unwrap(), 42);
        assert!(object.get_i32_or("word", -1).is_err());
        assert_eq!(object.get_i64_opt("missing").unwrap(), None);
        assert_eq!(object.get_i64_opt("n").unwrap(), Some(42));
        assert!(matches!(
            object.get_string_opt("nothing"),
            Err(CsonError::TypeMismatch { found: "null", .. })
        ));
    }

    #[test]
    fn bare_defaults_require_matching_kind() {
        assert_eq!(Value::from("12").as_i32_or(5).unwrap(), 5);
        assert_eq!(Value::from(12).as_i32_or(5).unwrap(), 12);
        assert_eq!(Value::Null.as_bool_or(true).unwrap(), true);
        assert_eq!(Value::from(1).as_string_or("d".into()).unwrap(), "d");
        assert_eq!(Value::from("xy").as_char_at_or(1, '?').unwrap(), 'y');
        assert_eq!(Value::from(Array::new().with("x")).as_char_or('?').unwrap(), '?');
    }

    #[test]
    fn single_element_arrays_degrade() {
        let value = Value::from(Array::new().with(Array::new().with("5")));
        assert_eq!(value.as_i32().unwrap(), 5);
        assert!(matches!(
            Value::from(Array::new()).as_i32(),
            Err(CsonError::InvalidState(_))
        ));
        assert!(matches!(
            Value::from(Array::new().with(1).with(2)).as_string(),
            Err(CsonError::InvalidState(_))
        ));
        assert!(matches!(
            Value::Null.as_i32(),
            Err(CsonError::TypeMismatch { .. })
        ));
        assert!(matches!(
            Value::from(Object::new()).as_bool(),
            Err(CsonError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn container_getters() {
        let object = sample();
        assert_eq!(object.get_object("nested").unwrap().get_string("k").unwrap(), "v");
        assert_eq!(object.get_array("one").unwrap().len(), 1);
        let empty = Array::new();
        assert!(object.get_array_or("missing", &empty).unwrap().is_empty());
        assert!(object.get_object_opt("missing").unwrap().is_none());
        assert!(object.get_array("nested").is_err());
        assert!(object.get_primitive("flag").unwrap().is_boolean());
        object.get_null("nothing").unwrap();
        assert!(object.get_null_opt("nothing").unwrap());
        assert!(!object.get_null_opt("missing").unwrap());
        assert!(object.get_null("n").is_err());
    }

    #[test]
    fn keyed_access_on_values() {
        let value = Value::from(sample());
        assert_eq!(value.get_i8("n").unwrap(), 42);
        assert_eq!(value.get_char_at("word", 4).unwrap(), 'o');
        assert!(matches!(
            Value::from(1).get_i32("n"),
            Err(CsonError::TypeMismatch { expected: "object", found: "number" })
        ));
    }
}
