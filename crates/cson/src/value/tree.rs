//! Whole-tree operations driven by explicit stacks.
//!
//! Copying, comparing, hashing and dropping a tree never recurse, so trees
//! nested as deeply as the parser accepts stay usable.

use std::hash::{Hash, Hasher};
use std::mem;

use crate::error::{CsonError, Result};
use crate::value::{Array, Object, Value};

/// An open container while a tree is being assembled.
#[derive(Debug)]
pub(crate) enum Container {
    Array(Array),
    Object(Object),
}

impl Container {
    pub(crate) fn is_object(&self) -> bool {
        matches!(self, Container::Object(_))
    }

    /// Appends to an array or inserts a named member into an object.
    /// Growth goes through `try_reserve`, so running out of memory surfaces
    /// as `ParseFailure`.
    pub(crate) fn deposit(&mut self, name: Option<String>, value: Value) -> Result<()> {
        match (self, name) {
            (Container::Array(array), None) => {
                array
                    .elements
                    .try_reserve(1)
                    .map_err(CsonError::parse_failure)?;
                array.elements.push(value);
                Ok(())
            }
            (Container::Object(object), Some(name)) => {
                object
                    .members
                    .try_reserve(1)
                    .map_err(CsonError::parse_failure)?;
                object.members.insert(name, value);
                Ok(())
            }
            (Container::Array(_), Some(_)) => Err(CsonError::Structural("member name inside an array")),
            (Container::Object(_), None) => Err(CsonError::Structural("object member without a name")),
        }
    }

    pub(crate) fn into_value(self) -> Value {
        match self {
            Container::Array(array) => Value::Array(array),
            Container::Object(object) => Value::Object(object),
        }
    }
}

enum Source<'a> {
    Array(std::slice::Iter<'a, Value>),
    Object(indexmap::map::Iter<'a, String, Value>),
}

struct CopyFrame<'a> {
    source: Source<'a>,
    target: Container,
    name: Option<String>,
}

impl<'a> CopyFrame<'a> {
    /// Opens a frame for a container; hands the name back for scalars.
    fn open(value: &'a Value, name: Option<String>) -> std::result::Result<Self, Option<String>> {
        match value {
            Value::Array(array) => Ok(Self {
                source: Source::Array(array.iter()),
                target: Container::Array(Array::with_capacity(array.len())),
                name,
            }),
            Value::Object(object) => Ok(Self {
                source: Source::Object(object.iter()),
                target: Container::Object(Object::with_capacity(object.len())),
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

    fn put(&mut self, name: Option<String>, value: Value) {
        match &mut self.target {
            Container::Array(array) => array.elements.push(value),
            Container::Object(object) => {
                object.members.insert(name.unwrap_or_default(), value);
            }
        }
    }
}

fn copy_scalar(value: &Value) -> Value {
    match value {
        Value::Primitive(primitive) => Value::Primitive(primitive.clone()),
        _ => Value::Null,
    }
}

pub(crate) fn copy_value(value: &Value) -> Value {
    let mut current = match CopyFrame::open(value, None) {
        Ok(frame) => frame,
        Err(_) => return copy_scalar(value),
    };
    let mut stack: Vec<CopyFrame<'_>> = Vec::new();
    loop {
        match current.next_child() {
            Some((name, child)) => match CopyFrame::open(child, name) {
                Ok(frame) => stack.push(mem::replace(&mut current, frame)),
                Err(name) => current.put(name, copy_scalar(child)),
            },
            None => {
                let CopyFrame { target, name, .. } = current;
                let finished = target.into_value();
                match stack.pop() {
                    Some(mut parent) => {
                        parent.put(name, finished);
                        current = parent;
                    }
                    None => return finished,
                }
            }
        }
    }
}

pub(crate) fn copy_array(array: &Array) -> Array {
    array.iter().map(copy_value).collect()
}

pub(crate) fn copy_object(object: &Object) -> Object {
    let mut copy = Object::with_capacity(object.len());
    for (name, value) in object.iter() {
        copy.members.insert(name.clone(), copy_value(value));
    }
    copy
}

/// Flattens nested containers before they are dropped.
pub(crate) fn dismantle(mut pending: Vec<Value>) {
    while let Some(value) = pending.pop() {
        match value {
            Value::Array(mut array) => pending.append(&mut array.elements),
            Value::Object(mut object) => {
                pending.extend(mem::take(&mut object.members).into_values());
            }
            _ => {}
        }
    }
}

pub(crate) fn all_equal(mut pending: Vec<(&Value, &Value)>) -> bool {
    while let Some(pair) = pending.pop() {
        match pair {
            (Value::Null, Value::Null) => {}
            (Value::Primitive(a), Value::Primitive(b)) => {
                if a != b {
                    return false;
                }
            }
            (Value::Array(a), Value::Array(b)) => {
                if a.len() != b.len() {
                    return false;
                }
                pending.extend(a.iter().zip(b.iter()));
            }
            (Value::Object(a), Value::Object(b)) => {
                if a.len() != b.len() {
                    return false;
                }
                for (name, value) in a.iter() {
                    match b.get(name) {
                        Some(theirs) => pending.push((value, theirs)),
                        None => return false,
                    }
                }
            }
            _ => return false,
        }
    }
    true
}

/// Hashes values popped from the end of `pending`.
pub(crate) fn hash_all<H: Hasher>(mut pending: Vec<&Value>, state: &mut H) {
    while let Some(value) = pending.pop() {
        match value {
            Value::Null => state.write_u8(0),
            Value::Primitive(primitive) => {
                state.write_u8(1);
                primitive.hash(state);
            }
            Value::Array(array) => {
                state.write_u8(2);
                array.len().hash(state);
                pending.extend(array.iter().rev());
            }
            Value::Object(object) => {
                state.write_u8(3);
                hash_object_shape(object, state);
            }
        }
    }
}

/// Objects compare without regard to member order, so only the member
/// count and the sorted key set feed the hash.
pub(crate) fn hash_object_shape<H: Hasher>(object: &Object, state: &mut H) {
    object.len().hash(state);
    let mut keys: Vec<&String> = object.keys().collect();
    keys.sort_unstable();
    for key in keys {
        key.hash(state);
    }
}
