/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 15/10/26
******************************************************************************/

//! Ordering and adjacency policies for sequence elements.
//!
//! A [`SequenceElementComparator`] does more than order elements: it also
//! decides whether two elements are *immediate* neighbours in the domain's
//! numbering scheme. [`Sequence`](super::Sequence) relies on both to tell a
//! contiguous run apart from a run with a silent gap.

use std::cmp::Ordering;
use std::fmt;

/// Total ordering plus immediate-adjacency tests over sequence elements.
///
/// Implementations must keep [`predecessor`](Self::predecessor) and
/// [`successor`](Self::successor) consistent with each other:
/// `predecessor(a, b)` holds exactly when `successor(b, a)` does. The
/// containers using the comparator do not check this.
///
/// # Examples
///
/// ```
/// use resequencer_rs::SequenceElementComparator;
/// use std::cmp::Ordering;
///
/// struct Consecutive;
///
/// impl SequenceElementComparator<i64> for Consecutive {
///     fn compare(&self, a: &i64, b: &i64) -> Ordering {
///         a.cmp(b)
///     }
///
///     fn predecessor(&self, a: &i64, b: &i64) -> bool {
///         b - a == 1
///     }
///
///     fn successor(&self, a: &i64, b: &i64) -> bool {
///         a - b == 1
///     }
/// }
///
/// assert!(Consecutive.predecessor(&4, &5));
/// assert!(!Consecutive.successor(&7, &5));
/// ```
pub trait SequenceElementComparator<E> {
    /// Orders `a` relative to `b`.
    fn compare(&self, a: &E, b: &E) -> Ordering;

    /// Returns `true` if `a` is the immediate predecessor of `b`.
    fn predecessor(&self, a: &E, b: &E) -> bool;

    /// Returns `true` if `a` is the immediate successor of `b`.
    fn successor(&self, a: &E, b: &E) -> bool;

    /// Returns `true` if `element` carries enough information to be placed
    /// in a sequence at all.
    fn is_valid(&self, _element: &E) -> bool {
        true
    }
}

/// Comparator for elements that carry a `u64` sequence number.
///
/// The number is pulled out of each element by an extractor closure. Two
/// elements are adjacent when their numbers differ by exactly one. Elements
/// the extractor returns `None` for are invalid and sort before every valid
/// element.
///
/// # Examples
///
/// ```
/// use resequencer_rs::{SequenceElementComparator, SequenceNumberComparator};
///
/// struct Message {
///     seq: Option<u64>,
/// }
///
/// let comparator = SequenceNumberComparator::new(|m: &Message| m.seq);
/// let a = Message { seq: Some(1) };
/// let b = Message { seq: Some(2) };
///
/// assert!(comparator.predecessor(&a, &b));
/// assert!(comparator.successor(&b, &a));
/// assert!(!comparator.is_valid(&Message { seq: None }));
/// ```
#[derive(Clone)]
pub struct SequenceNumberComparator<F> {
    extract: F,
}

impl<F> SequenceNumberComparator<F> {
    /// Creates a comparator reading sequence numbers with `extract`.
    #[must_use]
    pub fn new(extract: F) -> Self {
        Self { extract }
    }
}

impl<E, F> SequenceElementComparator<E> for SequenceNumberComparator<F>
where
    F: Fn(&E) -> Option<u64>,
{
    fn compare(&self, a: &E, b: &E) -> Ordering {
        (self.extract)(a).cmp(&(self.extract)(b))
    }

    fn predecessor(&self, a: &E, b: &E) -> bool {
        match ((self.extract)(a), (self.extract)(b)) {
            (Some(a), Some(b)) => a.checked_add(1) == Some(b),
            _ => false,
        }
    }

    fn successor(&self, a: &E, b: &E) -> bool {
        self.predecessor(b, a)
    }

    fn is_valid(&self, element: &E) -> bool {
        (self.extract)(element).is_some()
    }
}

impl<F> fmt::Debug for SequenceNumberComparator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceNumberComparator").finish_non_exhaustive()
    }
}
