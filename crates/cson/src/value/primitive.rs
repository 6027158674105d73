use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::error::{CsonError, Result};
use crate::number::Number;

/// A non-null scalar: boolean, number or string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool(bool),
    Number(Number),
    String(String),
}

macro_rules! parse_from_text {
    ($($name:ident -> $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&self) -> Result<$ty> {
                match self {
                    Primitive::Number(number) => number.$name(),
                    other => {
                        let text = other.as_string()?;
                        <$ty>::from_str(&text)
                            .map_err(|_| CsonError::conversion(stringify!($ty), text))
                    }
                }
            }
        )*
    };
}

impl Primitive {
    pub fn kind(&self) -> &'static str {
        match self {
            Primitive::Bool(_) => "boolean",
            Primitive::Number(_) => "number",
            Primitive::String(_) => "string",
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Primitive::Bool(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Primitive::Number(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Primitive::String(_))
    }

    /// Borrows the text of a string primitive.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Primitive::String(text) => Some(text),
            _ => None,
        }
    }

    /// Booleans return themselves; anything else is `true` only when its
    /// text is `"true"` in any letter case.
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Primitive::Bool(value) => Ok(*value),
            other => Ok(other.as_string()?.eq_ignore_ascii_case("true")),
        }
    }

    pub fn as_string(&self) -> Result<String> {
        Ok(match self {
            Primitive::Bool(value) => value.to_string(),
            Primitive::Number(number) => number.to_string(),
            Primitive::String(text) => text.clone(),
        })
    }

    pub fn as_char(&self) -> Result<char> {
        let text = self.as_string()?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Ok(ch),
            _ => Err(CsonError::conversion("char", text)),
        }
    }

    pub fn as_char_at(&self, index: usize) -> Result<char> {
        let text = self.as_string()?;
        text.chars()
            .nth(index)
            .ok_or_else(|| CsonError::conversion("char", text.as_str()))
    }

    /// Strings become lazily parsed numbers; booleans have no numeric view.
    pub fn as_number(&self) -> Result<Number> {
        match self {
            Primitive::Number(number) => Ok(number.clone()),
            Primitive::String(text) => Ok(Number::Lazy(text.clone())),
            Primitive::Bool(value) => Err(CsonError::conversion("number", value.to_string())),
        }
    }

    parse_from_text!(
        as_i8 -> i8,
        as_i16 -> i16,
        as_i32 -> i32,
        as_i64 -> i64,
        as_f32 -> f32,
        as_f64 -> f64,
    );

    pub fn as_big_integer(&self) -> Result<BigInt> {
        match self {
            Primitive::Number(Number::BigInteger(value)) => Ok(value.clone()),
            Primitive::Number(Number::Integer(value)) => Ok(BigInt::from(*value)),
            other => {
                let text = other.as_string()?;
                BigInt::from_str(&text).map_err(|_| CsonError::conversion("BigInt", text))
            }
        }
    }

    pub fn as_big_decimal(&self) -> Result<BigDecimal> {
        match self {
            Primitive::Number(Number::Decimal(value)) => Ok(value.clone()),
            other => {
                let text = other.as_string()?;
                BigDecimal::from_str(&text).map_err(|_| CsonError::conversion("BigDecimal", text))
            }
        }
    }
}

impl From<bool> for Primitive {
    fn from(value: bool) -> Self {
        Primitive::Bool(value)
    }
}

impl From<String> for Primitive {
    fn from(value: String) -> Self {
        Primitive::String(value)
    }
}

impl From<&str> for Primitive {
    fn from(value: &str) -> Self {
        Primitive::String(value.to_string())
    }
}

impl From<char> for Primitive {
    fn from(value: char) -> Self {
        Primitive::String(value.to_string())
    }
}

macro_rules! from_numeric {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Primitive {
                fn from(value: $ty) -> Self {
                    Primitive::Number(Number::from(value))
                }
            }
        )*
    };
}

from_numeric!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, BigInt, BigDecimal
);

impl From<Number> for Primitive {
    fn from(value: Number) -> Self {
        Primitive::Number(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_and_numbers_never_compare_equal() {
        assert_ne!(Primitive::from("1"), Primitive::from(1));
        assert_eq!(Primitive::from(1), Primitive::Number(Number::lazy("1")));
    }

    #[test]
    fn boolean_view_parses_text() {
        assert!(Primitive::from("TRUE").as_bool().unwrap());
        assert!(!Primitive::from("yes").as_bool().unwrap());
        assert!(!Primitive::from(1).as_bool().unwrap());
    }

    #[test]
    fn string_view_of_every_kind() {
        assert_eq!(Primitive::from(true).as_string().unwrap(), "true");
        assert_eq!(Primitive::from(2.5).as_string().unwrap(), "2.5");
        assert_eq!(Primitive::from('x').as_string().unwrap(), "x");
    }

    #[test]
    fn numeric_views_of_strings_parse_strictly() {
        assert_eq!(Primitive::from("42").as_i32().unwrap(), 42);
        assert_eq!(Primitive::from("2.5").as_f64().unwrap(), 2.5);
        assert!(matches!(
            Primitive::from("abc").as_i32(),
            Err(CsonError::Conversion { target: "i32", .. })
        ));
        assert!(Primitive::from(true).as_i64().is_err());
        assert!(Primitive::from("300").as_i8().is_err());
    }

    #[test]
    fn char_views() {
        assert_eq!(Primitive::from("é").as_char().unwrap(), 'é');
        assert!(Primitive::from("ab").as_char().is_err());
        assert!(Primitive::from("").as_char().is_err());
        assert_eq!(Primitive::from("abc").as_char_at(2).unwrap(), 'c');
        assert!(Primitive::from("abc").as_char_at(3).is_err());
    }

    #[test]
    fn big_views() {
        assert_eq!(
            Primitive::from(5).as_big_integer().unwrap(),
            BigInt::from(5)
        );
        assert!(Primitive::from(5.0).as_big_integer().is_err());
        assert_eq!(
            Primitive::from("123456789012345678901234567890")
                .as_big_integer()
                .unwrap()
                .to_string(),
            "123456789012345678901234567890"
        );
        assert_eq!(
            Primitive::from("0.10").as_big_decimal().unwrap(),
            BigDecimal::from_str("0.10").unwrap()
        );
    }

    #[test]
    fn number_view_of_strings_is_lazy() {
        let number = Primitive::from("12").as_number().unwrap();
        assert!(number.is_lazy());
        assert_eq!(number, Number::from(12));
        assert!(Primitive::from(false).as_number().is_err());
    }
}
