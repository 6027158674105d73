use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

use crate::error::{CsonError, Result};
use crate::value::{tree, Value};

/// String-keyed members in insertion order.
///
/// Re-inserting an existing key replaces its value in place; removal keeps
/// the relative order of the remaining members.
#[derive(Debug, Default)]
pub struct Object {
    pub(crate) members: IndexMap<String, Value>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            members: IndexMap::with_capacity(capacity),
        }
    }

    /// Builder form of [`Object::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns the value previously stored under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.members.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.members.shift_remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.members.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.members.get_mut(key)
    }

    /// Like [`Object::get`], failing with `MissingKey` when absent.
    pub fn member(&self, key: &str) -> Result<&Value> {
        self.get(key)
            .ok_or_else(|| CsonError::MissingKey(key.to_string()))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.members.contains_key(key)
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.members.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.members.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.members.iter()
    }

    pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, String, Value> {
        self.members.iter_mut()
    }
}

impl Clone for Object {
    fn clone(&self) -> Self {
        tree::copy_object(self)
    }
}

impl Drop for Object {
    fn drop(&mut self) {
        if self.members.values().any(Value::is_container) {
            let members = std::mem::take(&mut self.members);
            tree::dismantle(members.into_values().collect());
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        let mut pairs = Vec::with_capacity(self.len());
        for (key, value) in self.iter() {
            match other.get(key) {
                Some(theirs) => pairs.push((value, theirs)),
                None => return false,
            }
        }
        tree::all_equal(pairs)
    }
}

impl Eq for Object {}

impl Hash for Object {
    fn hash<H: Hasher>(&self, state: &mut H) {
        tree::hash_object_shape(self, state);
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut object = Object::new();
        object.extend(iter);
        object
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Object {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl IntoIterator for Object {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(mut self) -> Self::IntoIter {
        std::mem::take(&mut self.members).into_iter()
    }
}

impl<'a> IntoIterator for &'a Object {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reinsert_keeps_position() {
        let mut object = Object::new().with("a", 1).with("b", 2).with("c", 3);
        assert_eq!(object.insert("a", 10), Some(Value::from(1)));
        let keys: Vec<&String> = object.keys().collect();
        assert_eq!(keys, ["a", "b", "c"]);
        assert_eq!(object.get("a"), Some(&Value::from(10)));
    }

    #[test]
    fn remove_preserves_order() {
        let mut object: Object = [("x", 1), ("y", 2), ("z", 3)].into_iter().collect();
        assert_eq!(object.remove("x"), Some(Value::from(1)));
        assert_eq!(object.remove("missing"), None);
        let keys: Vec<&String> = object.keys().collect();
        assert_eq!(keys, ["y", "z"]);
    }

    #[test]
    fn equality_ignores_member_order() {
        let left = Object::new().with("a", 1).with("b", "x");
        let right = Object::new().with("b", "x").with("a", 1.0);
        assert_eq!(left, right);
        assert_ne!(left, Object::new().with("a", 1));
        assert_ne!(left, Object::new().with("a", 1).with("c", "x"));
    }

    #[test]
    fn member_reports_missing_key() {
        let object = Object::new().with("a", 1);
        assert!(object.member("a").is_ok());
        assert!(matches!(
            object.member("b"),
            Err(CsonError::MissingKey(key)) if key == "b"
        ));
    }
}
