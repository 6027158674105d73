//! Read-time reordering of object members and array elements.
//!
//! A [`Canonicalizer`] never changes what a container stores; it only
//! decides the order in which [`Canonicalizer::members`] and
//! [`Canonicalizer::elements`] hand children out.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::value::{Array, Object, Value};

/// Which container axes get sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortMode {
    #[default]
    None,
    Object,
    Array,
    ObjectArray,
}

impl SortMode {
    pub fn sorts_objects(self) -> bool {
        matches!(self, SortMode::Object | SortMode::ObjectArray)
    }

    pub fn sorts_arrays(self) -> bool {
        matches!(self, SortMode::Array | SortMode::ObjectArray)
    }
}

pub type KeyComparator = Arc<dyn Fn(&str, &str) -> Ordering + Send + Sync>;

fn natural_order() -> KeyComparator {
    Arc::new(|a: &str, b: &str| a.cmp(b))
}

/// A sort mode plus the string comparators used on each axis.
#[derive(Clone)]
pub struct Canonicalizer {
    mode: SortMode,
    object_order: KeyComparator,
    array_order: KeyComparator,
}

impl Canonicalizer {
    /// Natural string order on every active axis.
    pub fn new(mode: SortMode) -> Self {
        Self {
            mode,
            object_order: natural_order(),
            array_order: natural_order(),
        }
    }

    /// Stored order everywhere.
    pub fn insertion_order() -> Self {
        Self::new(SortMode::None)
    }

    pub fn with_object_comparator<F>(mut self, compare: F) -> Self
    where
        F: Fn(&str, &str) -> Ordering + Send + Sync + 'static,
    {
        self.object_order = Arc::new(compare);
        self
    }

    pub fn with_array_comparator<F>(mut self, compare: F) -> Self
    where
        F: Fn(&str, &str) -> Ordering + Send + Sync + 'static,
    {
        self.array_order = Arc::new(compare);
        self
    }

    pub fn mode(&self) -> SortMode {
        self.mode
    }

    /// Members in stored order, or by key when objects are sorted.
    pub fn members<'a>(&self, object: &'a Object) -> Members<'a> {
        if !self.mode.sorts_objects() {
            return Members::Stored(object.iter());
        }
        let mut entries: Vec<(&'a String, &'a Value)> = object.iter().collect();
        entries.sort_by(|a, b| (self.object_order)(a.0.as_str(), b.0.as_str()));
        Members::Sorted(entries.into_iter())
    }

    /// Elements in stored order, or ordered by the text of primitive
    /// elements when arrays are sorted. Any pair involving a non-primitive
    /// compares equal, which keeps such elements where the stable sort
    /// leaves them.
    pub fn elements<'a>(&self, array: &'a Array) -> Elements<'a> {
        if !self.mode.sorts_arrays() {
            return Elements::Stored(array.iter());
        }
        let mut keyed: Vec<(Option<String>, &'a Value)> = array
            .iter()
            .map(|value| (sort_key(value), value))
            .collect();
        binary_insertion_sort(&mut keyed, |a, b| match (&a.0, &b.0) {
            (Some(a), Some(b)) => (self.array_order)(a.as_str(), b.as_str()),
            _ => Ordering::Equal,
        });
        Elements::Sorted(
            keyed
                .into_iter()
                .map(|(_, value)| value)
                .collect::<Vec<_>>()
                .into_iter(),
        )
    }
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::insertion_order()
    }
}

impl fmt::Debug for Canonicalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canonicalizer")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

fn sort_key(value: &Value) -> Option<String> {
    match value {
        Value::Primitive(primitive) => primitive.as_string().ok(),
        _ => None,
    }
}

/// Stable sort that tolerates comparators which are not total orders.
///
/// A leading strictly descending run is reversed first, then every later
/// element is placed after the last element it does not compare less than.
fn binary_insertion_sort<T>(items: &mut [T], mut compare: impl FnMut(&T, &T) -> Ordering) {
    let len = items.len();
    if len < 2 {
        return;
    }
    let mut run = 2;
    if compare(&items[1], &items[0]) == Ordering::Less {
        while run < len && compare(&items[run], &items[run - 1]) == Ordering::Less {
            run += 1;
        }
        items[..run].reverse();
    } else {
        while run < len && compare(&items[run], &items[run - 1]) != Ordering::Less {
            run += 1;
        }
    }
    for i in run..len {
        let (mut left, mut right) = (0, i);
        while left < right {
            let mid = left + (right - left) / 2;
            if compare(&items[i], &items[mid]) == Ordering::Less {
                right = mid;
            } else {
                left = mid + 1;
            }
        }
        items[left..=i].rotate_right(1);
    }
}

/// Object members in canonical order.
#[derive(Debug)]
pub enum Members<'a> {
    Stored(indexmap::map::Iter<'a, String, Value>),
    Sorted(std::vec::IntoIter<(&'a String, &'a Value)>),
}

impl<'a> Iterator for Members<'a> {
    type Item = (&'a String, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Members::Stored(members) => members.next(),
            Members::Sorted(members) => members.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Members::Stored(members) => members.size_hint(),
            Members::Sorted(members) => members.size_hint(),
        }
    }
}

/// Array elements in canonical order.
#[derive(Debug)]
pub enum Elements<'a> {
    Stored(std::slice::Iter<'a, Value>),
    Sorted(std::vec::IntoIter<&'a Value>),
}

impl<'a> Iterator for Elements<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Elements::Stored(elements) => elements.next(),
            Elements::Sorted(elements) => elements.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Elements::Stored(elements) => elements.size_hint(),
            Elements::Sorted(elements) => elements.size_hint(),
        }
    }
}
