//! Conversion to and from `serde_json::Value`.

use std::mem;

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::canonical::{Canonicalizer, Elements, Members};
use crate::config;
use crate::error::{CsonError, Result};
use crate::number::{Number, Wire};
use crate::ser::MAX_DEPTH;
use crate::sink::EventSink;
use crate::value::{Primitive, Value};
use crate::writer::TreeWriter;

enum Frame<'a> {
    Array(std::slice::Iter<'a, JsonValue>),
    Object(serde_json::map::Iter<'a>),
}

fn json_number(number: &serde_json::Number) -> Number {
    if let Some(value) = number.as_i64() {
        Number::Integer(value)
    } else if let Some(value) = number.as_u64() {
        Number::from(value)
    } else if let Some(value) = number.as_f64() {
        Number::Float(value)
    } else {
        Number::lazy(number.to_string())
    }
}

fn scalar_event<S: EventSink + ?Sized>(value: &JsonValue, sink: &mut S) -> Result<()> {
    match value {
        JsonValue::Null => sink.null_value(),
        JsonValue::Bool(flag) => sink.bool_value(*flag),
        JsonValue::Number(number) => sink.number_value(json_number(number)),
        JsonValue::String(text) => sink.string_value(text),
        JsonValue::Array(_) | JsonValue::Object(_) => Ok(()),
    }
}

/// Replays a `serde_json` tree as events, without recursion.
pub fn drain_json_value<S: EventSink + ?Sized>(value: &JsonValue, sink: &mut S) -> Result<()> {
    let mut stack: Vec<Frame<'_>> = Vec::new();
    let mut next = Some(value);
    loop {
        match next.take() {
            Some(JsonValue::Array(items)) => {
                sink.begin_array()?;
                stack.push(Frame::Array(items.iter()));
            }
            Some(JsonValue::Object(members)) => {
                sink.begin_object()?;
                stack.push(Frame::Object(members.iter()));
            }
            Some(scalar) => scalar_event(scalar, sink)?,
            None => {}
        }
        let Some(top) = stack.last_mut() else {
            return Ok(());
        };
        match top {
            Frame::Array(items) => match items.next() {
                Some(item) => next = Some(item),
                None => {
                    stack.pop();
                    sink.end_array()?;
                }
            },
            Frame::Object(members) => match members.next() {
                Some((name, member)) => {
                    sink.name(name)?;
                    next = Some(member);
                }
                None => {
                    stack.pop();
                    sink.end_object()?;
                }
            },
        }
    }
}

enum Source<'a> {
    Array(Elements<'a>),
    Object(Members<'a>),
}

enum Target {
    Array(Vec<JsonValue>),
    Object(JsonMap<String, JsonValue>),
}

/// A container being rebuilt as a `serde_json` value.
struct BuildFrame<'a> {
    source: Source<'a>,
    target: Target,
    name: Option<String>,
}

impl<'a> BuildFrame<'a> {
    fn open(
        value: &'a Value,
        name: Option<String>,
        canonicalizer: &Canonicalizer,
    ) -> std::result::Result<Self, Option<String>> {
        match value {
            Value::Array(array) => Ok(Self {
                source: Source::Array(canonicalizer.elements(array)),
                target: Target::Array(Vec::with_capacity(array.len())),
                name,
            }),
            Value::Object(object) => Ok(Self {
                source: Source::Object(canonicalizer.members(object)),
                target: Target::Object(JsonMap::with_capacity(object.len())),
                name,
            }),
            _ => Err(name),
        }
    }

    fn next_child(&mut self) -> Option<(Option<String>, &'a Value)> {
        match &mut self.source {
            Source::Array(elements) => elements.next().map(|value| (None, value)),
            Source::Object(members) => members
                .next()
                .map(|(name, value)| (Some(name.clone()), value)),
        }
    }

    fn put(&mut self, name: Option<String>, value: JsonValue) {
        match &mut self.target {
            Target::Array(items) => items.push(value),
            Target::Object(members) => {
                members.insert(name.unwrap_or_default(), value);
            }
        }
    }

    fn finish(self) -> (Option<String>, JsonValue) {
        let value = match self.target {
            Target::Array(items) => JsonValue::Array(items),
            Target::Object(members) => JsonValue::Object(members),
        };
        (self.name, value)
    }
}

fn json_scalar(value: &Value) -> Result<JsonValue> {
    match value {
        Value::Primitive(Primitive::Bool(flag)) => Ok(JsonValue::Bool(*flag)),
        Value::Primitive(Primitive::String(text)) => Ok(JsonValue::String(text.clone())),
        Value::Primitive(Primitive::Number(number)) => json_from_number(number),
        _ => Ok(JsonValue::Null),
    }
}

fn json_from_number(number: &Number) -> Result<JsonValue> {
    match number.wire()? {
        Wire::Signed(value) => Ok(value.into()),
        Wire::Unsigned(value) => Ok(value.into()),
        Wire::WideSigned(_) | Wire::WideUnsigned(_) | Wire::Oversized => {
            Err(CsonError::NumberOutOfRange(number.to_string()))
        }
        Wire::Float(value) => {
            Ok(serde_json::Number::from_f64(value).map_or(JsonValue::Null, JsonValue::Number))
        }
    }
}

impl Value {
    pub fn from_json_value(value: &JsonValue) -> Result<Value> {
        let mut writer = TreeWriter::new().lenient(true);
        drain_json_value(value, &mut writer)?;
        writer.finish()
    }

    /// Members follow the global canonical order. Non-finite numbers
    /// become `null`; integers outside the `i64`/`u64` range fail with
    /// [`CsonError::NumberOutOfRange`].
    ///
    /// Built without recursion. Trees nested deeper than [`MAX_DEPTH`]
    /// fail with [`CsonError::DepthLimit`].
    pub fn to_json_value(&self) -> Result<JsonValue> {
        let canonicalizer = config::global().canonicalizer;
        let mut current = match BuildFrame::open(self, None, &canonicalizer) {
            Ok(frame) => frame,
            Err(_) => return json_scalar(self),
        };
        let mut stack: Vec<BuildFrame<'_>> = Vec::new();
        loop {
            match current.next_child() {
                Some((name, child)) => match BuildFrame::open(child, name, &canonicalizer) {
                    Ok(frame) => {
                        if stack.len() + 2 > MAX_DEPTH {
                            return Err(CsonError::DepthLimit { limit: MAX_DEPTH });
                        }
                        stack.push(mem::replace(&mut current, frame));
                    }
                    Err(name) => current.put(name, json_scalar(child)?),
                },
                None => {
                    let (name, finished) = current.finish();
                    match stack.pop() {
                        Some(mut parent) => {
                            parent.put(name, finished);
                            current = parent;
                        }
                        None => return Ok(finished),
                    }
                }
            }
        }
    }
}
