use std::hash::{Hash, Hasher};

use crate::error::{CsonError, Result};
use crate::value::{tree, Value};

/// Ordered, resizable sequence of values.
#[derive(Debug, Default)]
pub struct Array {
    pub(crate) elements: Vec<Value>,
}

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
        }
    }

    /// Builder form of [`Array::push`].
    pub fn with(mut self, value: impl Into<Value>) -> Self {
        self.push(value);
        self
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.elements.push(value.into());
    }

    pub fn insert(&mut self, index: usize, value: impl Into<Value>) -> Result<()> {
        if index > self.len() {
            return Err(self.out_of_bounds(index));
        }
        self.elements.insert(index, value.into());
        Ok(())
    }

    /// Replaces the element at `index`, returning the previous one.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) -> Result<Value> {
        let len = self.len();
        match self.elements.get_mut(index) {
            Some(slot) => Ok(std::mem::replace(slot, value.into())),
            None => Err(CsonError::IndexOutOfBounds { index, len }),
        }
    }

    pub fn remove(&mut self, index: usize) -> Result<Value> {
        if index >= self.len() {
            return Err(self.out_of_bounds(index));
        }
        Ok(self.elements.remove(index))
    }

    /// Removes the first element equal to `value`.
    pub fn remove_value(&mut self, value: &Value) -> bool {
        match self.elements.iter().position(|element| element == value) {
            Some(index) => {
                self.elements.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.elements.iter().any(|element| element == value)
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.elements.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.elements.get_mut(index)
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.elements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.elements.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Value> {
        self.elements.iter_mut()
    }

    pub fn into_vec(mut self) -> Vec<Value> {
        std::mem::take(&mut self.elements)
    }

    /// The sole element of a one-element array.
    pub fn single(&self) -> Result<&Value> {
        match self.elements.as_slice() {
            [only] => Ok(only),
            elements => Err(CsonError::InvalidState(format!(
                "array must have exactly one element, but has {}",
                elements.len()
            ))),
        }
    }

    fn out_of_bounds(&self, index: usize) -> CsonError {
        CsonError::IndexOutOfBounds {
            index,
            len: self.len(),
        }
    }
}

impl Clone for Array {
    fn clone(&self) -> Self {
        tree::copy_array(self)
    }
}

impl Drop for Array {
    fn drop(&mut self) {
        if self.elements.iter().any(Value::is_container) {
            tree::dismantle(std::mem::take(&mut self.elements));
        }
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && tree::all_equal(self.iter().zip(other.iter()).collect())
    }
}

impl Eq for Array {}

impl Hash for Array {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        tree::hash_all(self.iter().rev().collect(), state);
    }
}

impl<T: Into<Value>> From<Vec<T>> for Array {
    fn from(values: Vec<T>) -> Self {
        values.into_iter().collect()
    }
}

impl<T: Into<Value>> FromIterator<T> for Array {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<T: Into<Value>> Extend<T> for Array {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.elements.extend(iter.into_iter().map(Into::into));
    }
}

impl IntoIterator for Array {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_remove_check_bounds() {
        let mut array = Array::new().with(1).with("two");
        assert_eq!(array.set(1, 2).unwrap(), Value::from("two"));
        assert!(matches!(
            array.set(2, 3),
            Err(CsonError::IndexOutOfBounds { index: 2, len: 2 })
        ));
        assert_eq!(array.remove(0).unwrap(), Value::from(1));
        assert!(array.remove(5).is_err());
        assert_eq!(array.len(), 1);
    }

    #[test]
    fn insert_accepts_the_end_position() {
        let mut array = Array::from(vec![1, 3]);
        array.insert(1, 2).unwrap();
        array.insert(3, 4).unwrap();
        assert!(array.insert(9, 5).is_err());
        assert_eq!(array, Array::from(vec![1, 2, 3, 4]));
    }

    #[test]
    fn remove_value_uses_numeric_equality() {
        let mut array = Array::from(vec![Value::from(1.0), Value::from("1")]);
        assert!(array.contains(&Value::from(1)));
        assert!(array.remove_value(&Value::from(1)));
        assert_eq!(array, Array::new().with("1"));
        assert!(!array.remove_value(&Value::from(1)));
    }

    #[test]
    fn single_element_access() {
        assert_eq!(Array::new().with(5).single().unwrap(), &Value::from(5));
        assert!(matches!(
            Array::new().single(),
            Err(CsonError::InvalidState(_))
        ));
        assert!(Array::from(vec![1, 2]).single().is_err());
    }

    #[test]
    fn equality_is_order_sensitive() {
        assert_ne!(Array::from(vec![1, 2]), Array::from(vec![2, 1]));
        assert_eq!(Array::from(vec![1, 2]), Array::from(vec![1.0, 2.0]));
    }
}
