/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 15/10/26
******************************************************************************/

//! Ordered sequence set with immediate-neighbour queries.
//!
//! [`Sequence`] keeps elements sorted by a [`SequenceElementComparator`] and
//! separates two questions a resequencer has to ask:
//!
//! - which buffered element is *nearest* below or above `e` by total order
//!   ([`lower`](Sequence::lower) / [`higher`](Sequence::higher)), and
//! - whether that nearest element is the *immediate* predecessor or successor
//!   of `e` in the domain's numbering
//!   ([`predecessor`](Sequence::predecessor) /
//!   [`successor`](Sequence::successor)).
//!
//! The set is backed by a skip list, so both lookups are `O(log n)`.

use super::comparator::SequenceElementComparator;
use crossbeam_skiplist::SkipSet;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Bound;
use std::sync::Arc;

/// An element paired with the comparator that ranks it.
///
/// The skip list orders by `Ord`, so each stored element carries a handle to
/// the shared comparator.
struct Ranked<E, C> {
    element: E,
    comparator: Arc<C>,
}

impl<E, C: SequenceElementComparator<E>> PartialEq for Ranked<E, C> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<E, C: SequenceElementComparator<E>> Eq for Ranked<E, C> {}

impl<E, C: SequenceElementComparator<E>> PartialOrd for Ranked<E, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E, C: SequenceElementComparator<E>> Ord for Ranked<E, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.comparator.compare(&self.element, &other.element)
    }
}

/// A sorted set of in-flight sequence elements.
///
/// Elements are kept in ascending `compare` order and no two retained
/// elements compare equal. The set performs no locking of its own: owners
/// that share it with timer callbacks must serialize access themselves.
///
/// # Examples
///
/// ```
/// use resequencer_rs::{Sequence, SequenceNumberComparator};
///
/// let mut sequence = Sequence::new(SequenceNumberComparator::new(|n: &u64| Some(*n)));
/// sequence.insert(1);
/// sequence.insert(2);
/// sequence.insert(4);
///
/// // 2 is the nearest lower element, but 3 is missing.
/// assert_eq!(sequence.lower(&4), Some(2));
/// assert_eq!(sequence.predecessor(&4), None);
/// ```
pub struct Sequence<E, C> {
    entries: SkipSet<Ranked<E, C>>,
    comparator: Arc<C>,
}

impl<E, C> Sequence<E, C>
where
    E: Clone + Send + 'static,
    C: SequenceElementComparator<E> + Send + Sync + 'static,
{
    /// Creates an empty sequence ordered by `comparator`.
    #[must_use]
    pub fn new(comparator: C) -> Self {
        Self::with_shared(Arc::new(comparator))
    }

    /// Creates an empty sequence using an already shared comparator.
    #[must_use]
    pub fn with_shared(comparator: Arc<C>) -> Self {
        Self {
            entries: SkipSet::new(),
            comparator,
        }
    }

    /// Returns the comparator that orders this sequence.
    #[must_use]
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    fn rank(&self, element: E) -> Ranked<E, C> {
        Ranked {
            element,
            comparator: Arc::clone(&self.comparator),
        }
    }

    /// Adds `element` in sorted position.
    ///
    /// Returns `false` and leaves the set unchanged if an element comparing
    /// equal is already present.
    pub fn insert(&mut self, element: E) -> bool {
        let ranked = self.rank(element);
        if self.entries.contains(&ranked) {
            return false;
        }
        self.entries.insert(ranked);
        true
    }

    /// Returns the immediate predecessor of `element`, if buffered.
    ///
    /// Looks up the greatest element strictly less than `element` and
    /// returns it only if the comparator accepts it as the immediate
    /// predecessor. A nearest lower element separated by a gap yields `None`.
    #[must_use]
    pub fn predecessor(&self, element: &E) -> Option<E> {
        let probe = self.rank(element.clone());
        let entry = self.entries.upper_bound(Bound::Excluded(&probe))?;
        let lower = &entry.value().element;
        self.comparator
            .predecessor(lower, element)
            .then(|| lower.clone())
    }

    /// Returns the immediate successor of `element`, if buffered.
    ///
    /// Looks up the least element strictly greater than `element` and
    /// returns it only if the comparator accepts it as the immediate
    /// successor. A nearest higher element separated by a gap yields `None`.
    #[must_use]
    pub fn successor(&self, element: &E) -> Option<E> {
        let probe = self.rank(element.clone());
        let entry = self.entries.lower_bound(Bound::Excluded(&probe))?;
        let higher = &entry.value().element;
        self.comparator
            .successor(higher, element)
            .then(|| higher.clone())
    }

    /// Returns the greatest element strictly less than `element`.
    #[must_use]
    pub fn lower(&self, element: &E) -> Option<E> {
        let probe = self.rank(element.clone());
        self.entries
            .upper_bound(Bound::Excluded(&probe))
            .map(|entry| entry.value().element.clone())
    }

    /// Returns the least element strictly greater than `element`.
    #[must_use]
    pub fn higher(&self, element: &E) -> Option<E> {
        let probe = self.rank(element.clone());
        self.entries
            .lower_bound(Bound::Excluded(&probe))
            .map(|entry| entry.value().element.clone())
    }

    /// Returns `true` if an element comparing equal to `element` is present.
    #[must_use]
    pub fn contains(&self, element: &E) -> bool {
        self.entries.contains(&self.rank(element.clone()))
    }

    /// Returns the stored element comparing equal to `element`.
    #[must_use]
    pub fn get(&self, element: &E) -> Option<E> {
        self.entries
            .get(&self.rank(element.clone()))
            .map(|entry| entry.value().element.clone())
    }

    /// Removes and returns the element comparing equal to `element`.
    pub fn remove(&mut self, element: &E) -> Option<E> {
        self.entries
            .remove(&self.rank(element.clone()))
            .map(|entry| entry.value().element.clone())
    }

    /// Returns the smallest element.
    #[must_use]
    pub fn first(&self) -> Option<E> {
        self.entries
            .front()
            .map(|entry| entry.value().element.clone())
    }

    /// Returns the largest element.
    #[must_use]
    pub fn last(&self) -> Option<E> {
        self.entries
            .back()
            .map(|entry| entry.value().element.clone())
    }

    /// Removes and returns the smallest element.
    pub fn pop_first(&mut self) -> Option<E> {
        self.entries
            .pop_front()
            .map(|entry| entry.value().element.clone())
    }

    /// Removes and returns the largest element.
    pub fn pop_last(&mut self) -> Option<E> {
        self.entries
            .pop_back()
            .map(|entry| entry.value().element.clone())
    }

    /// Iterates over the elements in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = E> + '_ {
        self.entries
            .iter()
            .map(|entry| entry.value().element.clone())
    }

    /// Returns the number of buffered elements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is buffered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<E, C> fmt::Debug for Sequence<E, C>
where
    E: Clone + Send + fmt::Debug + 'static,
    C: SequenceElementComparator<E> + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
