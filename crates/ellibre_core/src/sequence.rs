//! Observable sequences
//!
//! [`ObservableVec`] forwards every sequence operation to an unbounded backing
//! vector and reports mutations as a [`Change`] record of added and removed
//! elements.
//!
//! The *capacity* only gates the indexed view ([`ObservableVec::slot`] and
//! [`ObservableVec::set`]); the backing sequence may grow past it through
//! `push`, `unshift` or `splice`.
//!
//! Slots can be empty: assigning past the end or growing with
//! [`ObservableVec::set_len`] leaves holes, which iteration skips.

use std::fmt;
use std::ops::{Bound, RangeBounds};

use tracing::trace;

use crate::error::SequenceError;

/// A change record
#[derive(Clone, Debug, PartialEq)]
pub struct Change<T> {
    pub added: Vec<T>,
    pub removed: Vec<T>,
}

impl<T> Change<T> {
    pub fn added(added: Vec<T>) -> Self {
        Self {
            added,
            removed: Vec::new(),
        }
    }

    pub fn removed(removed: Vec<T>) -> Self {
        Self {
            added: Vec::new(),
            removed,
        }
    }
}

/// Callback receiving change records
pub type ChangeHandler<T> = Box<dyn FnMut(&Change<T>)>;

/// A sequence that reports its mutations
pub struct ObservableVec<T> {
    items: Vec<Option<T>>,
    capacity: usize,
    observer: Option<ChangeHandler<T>>,
}

impl<T: Clone> ObservableVec<T> {
    /// Create an empty sequence with `capacity` indexable slots
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
            observer: None,
        }
    }

    /// Create an empty sequence reporting to `observer`
    pub fn with_observer(capacity: usize, observer: impl FnMut(&Change<T>) + 'static) -> Self {
        Self {
            items: Vec::new(),
            capacity,
            observer: Some(Box::new(observer)),
        }
    }

    /// Replace the change observer
    pub fn set_observer(&mut self, observer: impl FnMut(&Change<T>) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    fn notify(&mut self, change: Change<T>) {
        trace!(
            added = change.added.len(),
            removed = change.removed.len(),
            "sequence change"
        );
        if let Some(observer) = self.observer.as_mut() {
            observer(&change);
        }
    }

    /// Number of directly indexable slots
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Length of the backing sequence (holes included)
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Truncate or extend the backing sequence. Does not emit a change record.
    pub fn set_len(&mut self, len: usize) {
        self.items.resize_with(len, || None);
    }

    /// Read any backing index, ignoring capacity
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index).and_then(Option::as_ref)
    }

    /// Read through the indexed view
    pub fn slot(&self, index: usize) -> Result<Option<&T>, SequenceError> {
        self.check_capacity(index)?;
        Ok(self.get(index))
    }

    /// Assign through the indexed view.
    ///
    /// Emits `{added: [value], removed: [old]}`, with `removed` empty when the
    /// slot held nothing. Assigning past the end leaves holes in between.
    pub fn set(&mut self, index: usize, value: T) -> Result<(), SequenceError> {
        self.check_capacity(index)?;
        if index >= self.items.len() {
            self.items.resize_with(index + 1, || None);
        }
        let old = self.items[index].replace(value.clone());
        self.notify(Change {
            added: vec![value],
            removed: old.into_iter().collect(),
        });
        Ok(())
    }

    fn check_capacity(&self, index: usize) -> Result<(), SequenceError> {
        if index < self.capacity {
            Ok(())
        } else {
            Err(SequenceError::BeyondCapacity {
                index,
                capacity: self.capacity,
            })
        }
    }

    /// Append elements; returns the new length
    pub fn push(&mut self, items: impl IntoIterator<Item = T>) -> usize {
        let added: Vec<T> = items.into_iter().collect();
        self.items.extend(added.iter().cloned().map(Some));
        self.notify(Change::added(added));
        self.items.len()
    }

    /// Remove the last element
    pub fn pop(&mut self) -> Option<T> {
        let removed = self.items.pop().flatten();
        self.notify(Change::removed(removed.iter().cloned().collect()));
        removed
    }

    /// Remove the first element
    pub fn shift(&mut self) -> Option<T> {
        let removed = if self.items.is_empty() {
            None
        } else {
            self.items.remove(0)
        };
        self.notify(Change::removed(removed.iter().cloned().collect()));
        removed
    }

    /// Prepend elements (keeping their order); returns the new length
    pub fn unshift(&mut self, items: impl IntoIterator<Item = T>) -> usize {
        let added: Vec<T> = items.into_iter().collect();
        self.items.splice(0..0, added.iter().cloned().map(Some));
        self.notify(Change::added(added));
        self.items.len()
    }

    /// Remove `delete_count` elements at `start` (through the end when `None`)
    /// and insert `items` in their place. Returns the removed elements.
    ///
    /// `start` past the end is clamped to the length.
    pub fn splice(
        &mut self,
        start: usize,
        delete_count: Option<usize>,
        items: impl IntoIterator<Item = T>,
    ) -> Vec<T> {
        let len = self.items.len();
        let start = start.min(len);
        let end = match delete_count {
            Some(count) => start.saturating_add(count).min(len),
            None => len,
        };

        let added: Vec<T> = items.into_iter().collect();
        let removed: Vec<T> = self
            .items
            .splice(start..end, added.iter().cloned().map(Some))
            .flatten()
            .collect();

        self.notify(Change {
            added,
            removed: removed.clone(),
        });
        removed
    }

    /// Overwrite the slots in `range` with `value`.
    ///
    /// The change record lists the whole resulting sequence as added; displaced
    /// elements are not reported.
    pub fn fill(&mut self, value: T, range: impl RangeBounds<usize>) {
        let len = self.items.len();
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        }
        .min(len);
        let end = match range.end_bound() {
            Bound::Included(&e) => e.saturating_add(1),
            Bound::Excluded(&e) => e,
            Bound::Unbounded => len,
        }
        .min(len);

        for slot in self.items.iter_mut().take(end).skip(start) {
            *slot = Some(value.clone());
        }
        let added = self.to_vec();
        self.notify(Change::added(added));
    }

    /// Reverse in place. Does not emit a change record.
    pub fn reverse(&mut self) {
        self.items.reverse();
    }

    /// Stable sort in place, holes last. Does not emit a change record.
    pub fn sort_by(&mut self, mut compare: impl FnMut(&T, &T) -> std::cmp::Ordering) {
        self.items.sort_by(|a, b| match (a, b) {
            (Some(a), Some(b)) => compare(a, b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
    }

    /// Iterate over the present elements
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter().flatten()
    }

    /// Copy out the present elements
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    /// Copy out the present elements of a backing range
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Vec<T> {
        let len = self.items.len();
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        }
        .min(len);
        let end = match range.end_bound() {
            Bound::Included(&e) => e.saturating_add(1),
            Bound::Excluded(&e) => e,
            Bound::Unbounded => len,
        }
        .min(len)
        .max(start);
        self.items[start..end].iter().flatten().cloned().collect()
    }
}

impl<T: Clone + PartialEq> ObservableVec<T> {
    pub fn contains(&self, value: &T) -> bool {
        self.iter().any(|item| item == value)
    }

    /// Backing index of the first element equal to `value`
    pub fn index_of(&self, value: &T) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.as_ref() == Some(value))
    }
}

impl<T: Clone + fmt::Display> ObservableVec<T> {
    /// Join the elements with `separator`; holes render as empty strings
    pub fn join(&self, separator: &str) -> String {
        self.items
            .iter()
            .map(|item| item.as_ref().map(ToString::to_string).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableVec")
            .field("items", &self.items)
            .field("capacity", &self.capacity)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorded(capacity: usize) -> (ObservableVec<i32>, Rc<RefCell<Vec<Change<i32>>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        let seq = ObservableVec::with_observer(capacity, move |change: &Change<i32>| {
            l.borrow_mut().push(change.clone());
        });
        (seq, log)
    }

    fn last(log: &Rc<RefCell<Vec<Change<i32>>>>) -> Change<i32> {
        log.borrow().last().cloned().unwrap()
    }

    #[test]
    fn test_push_pop_set() {
        let (mut seq, log) = recorded(3);

        assert_eq!(seq.push([1, 2, 3]), 3);
        assert_eq!(last(&log), Change::added(vec![1, 2, 3]));

        assert_eq!(seq.pop(), Some(3));
        assert_eq!(last(&log), Change::removed(vec![3]));

        seq.set(0, 9).unwrap();
        assert_eq!(
            last(&log),
            Change {
                added: vec![9],
                removed: vec![1]
            }
        );
        assert_eq!(seq.to_vec(), vec![9, 2]);
    }

    #[test]
    fn test_shift_unshift() {
        let (mut seq, log) = recorded(4);
        seq.push([3, 4]);

        assert_eq!(seq.unshift([1, 2]), 4);
        assert_eq!(last(&log), Change::added(vec![1, 2]));
        assert_eq!(seq.to_vec(), vec![1, 2, 3, 4]);

        assert_eq!(seq.shift(), Some(1));
        assert_eq!(last(&log), Change::removed(vec![1]));
    }

    #[test]
    fn test_pop_on_empty_reports_nothing_removed() {
        let (mut seq, log) = recorded(2);
        assert_eq!(seq.pop(), None);
        assert_eq!(seq.shift(), None);
        assert_eq!(last(&log), Change::removed(vec![]));
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_splice() {
        let (mut seq, log) = recorded(8);
        seq.push([1, 2, 3, 4, 5]);

        let removed = seq.splice(1, Some(2), [20, 30, 40]);
        assert_eq!(removed, vec![2, 3]);
        assert_eq!(
            last(&log),
            Change {
                added: vec![20, 30, 40],
                removed: vec![2, 3]
            }
        );
        assert_eq!(seq.to_vec(), vec![1, 20, 30, 40, 4, 5]);

        // no delete count removes through the end
        let removed = seq.splice(4, None, []);
        assert_eq!(removed, vec![4, 5]);
        assert_eq!(last(&log), Change::removed(vec![4, 5]));
        assert_eq!(seq.len(), 4);
    }

    #[test]
    fn test_fill_reports_whole_sequence() {
        let (mut seq, log) = recorded(4);
        seq.push([1, 2, 3]);

        seq.fill(0, 1..);
        assert_eq!(seq.to_vec(), vec![1, 0, 0]);
        assert_eq!(last(&log), Change::added(vec![1, 0, 0]));
    }

    #[test]
    fn test_capacity_gates_only_the_view() {
        let (mut seq, _log) = recorded(2);
        seq.push([1, 2, 3, 4]);
        assert_eq!(seq.len(), 4);

        assert_eq!(seq.slot(1), Ok(Some(&2)));
        assert_eq!(
            seq.slot(3),
            Err(SequenceError::BeyondCapacity {
                index: 3,
                capacity: 2
            })
        );
        assert!(seq.set(2, 7).is_err());
        // the backing sequence is still reachable directly
        assert_eq!(seq.get(3), Some(&4));
    }

    #[test]
    fn test_set_past_end_leaves_holes() {
        let (mut seq, log) = recorded(5);
        seq.set(3, 1).unwrap();
        assert_eq!(seq.len(), 4);
        assert_eq!(seq.slot(0), Ok(None));
        assert_eq!(last(&log), Change::added(vec![1]));
        assert_eq!(seq.join(","), ",,,1");
    }

    #[test]
    fn test_set_len_is_silent() {
        let (mut seq, log) = recorded(3);
        seq.push([1, 2, 3]);
        let before = log.borrow().len();

        seq.set_len(1);
        assert_eq!(seq.to_vec(), vec![1]);
        seq.set_len(3);
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.to_vec(), vec![1]);
        assert_eq!(log.borrow().len(), before);
    }

    #[test]
    fn test_reorderings_are_silent() {
        let (mut seq, log) = recorded(3);
        seq.push([2, 3, 1]);
        let before = log.borrow().len();

        seq.sort_by(|a, b| a.cmp(b));
        assert_eq!(seq.to_vec(), vec![1, 2, 3]);
        seq.reverse();
        assert_eq!(seq.to_vec(), vec![3, 2, 1]);
        assert_eq!(log.borrow().len(), before);
    }

    #[test]
    fn test_queries() {
        let mut seq = ObservableVec::new(4);
        seq.push(["a", "b", "c"]);

        assert!(seq.contains(&"b"));
        assert_eq!(seq.index_of(&"c"), Some(2));
        assert_eq!(seq.index_of(&"z"), None);
        assert_eq!(seq.slice(1..), vec!["b", "c"]);
        assert_eq!(seq.join("-"), "a-b-c");
    }
}
