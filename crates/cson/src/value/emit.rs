//! Replays a tree as structural events in canonical order.

use crate::canonical::{Canonicalizer, Elements, Members};
use crate::error::Result;
use crate::sink::EventSink;
use crate::value::Value;
use crate::writer::TreeWriter;

enum Frame<'a> {
    Array(Elements<'a>),
    Object(Members<'a>),
}

impl Value {
    /// Feeds this tree to `sink`, visiting children in the order chosen by
    /// `canonicalizer`. Uses an explicit stack instead of recursion.
    pub fn write_events<S>(&self, sink: &mut S, canonicalizer: &Canonicalizer) -> Result<()>
    where
        S: EventSink + ?Sized,
    {
        let mut stack: Vec<Frame<'_>> = Vec::new();
        let mut pending = Some(self);
        loop {
            if let Some(value) = pending.take() {
                match value {
                    Value::Null => sink.null_value()?,
                    Value::Primitive(primitive) => sink.value(primitive.clone())?,
                    Value::Array(array) => {
                        sink.begin_array()?;
                        stack.push(Frame::Array(canonicalizer.elements(array)));
                    }
                    Value::Object(object) => {
                        sink.begin_object()?;
                        stack.push(Frame::Object(canonicalizer.members(object)));
                    }
                }
            }
            let Some(top) = stack.last_mut() else {
                return Ok(());
            };
            match top {
                Frame::Array(elements) => match elements.next() {
                    Some(element) => pending = Some(element),
                    None => {
                        stack.pop();
                        sink.end_array()?;
                    }
                },
                Frame::Object(members) => match members.next() {
                    Some((name, member)) => {
                        sink.name(name)?;
                        pending = Some(member);
                    }
                    None => {
                        stack.pop();
                        sink.end_object()?;
                    }
                },
            }
        }
    }

    /// A copy whose stored order is the canonical order of this tree.
    pub fn to_canonical(&self, canonicalizer: &Canonicalizer) -> Result<Value> {
        let mut writer = TreeWriter::new().lenient(true);
        self.write_events(&mut writer, canonicalizer)?;
        writer.finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::canonical::{Canonicalizer, SortMode};
    use crate::value::{Array, Object, Value};

    #[test]
    fn canonical_copy_reorders_storage() {
        let value = Value::from(
            Object::new()
                .with("b", Array::from(vec!["y", "x"]))
                .with("a", Value::Null),
        );
        let sorted = value
            .to_canonical(&Canonicalizer::new(SortMode::ObjectArray))
            .unwrap();
        let object = sorted.as_object().unwrap();
        let keys: Vec<&String> = object.keys().collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(
            object.get("b").unwrap().as_array().unwrap().get(0),
            Some(&Value::from("x"))
        );
        assert_ne!(sorted, value);

        let by_key = value
            .to_canonical(&Canonicalizer::new(SortMode::Object))
            .unwrap();
        assert_eq!(by_key, value);
    }
}
