/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 15/10/26
******************************************************************************/

//! # resequencer-rs
//!
//! Building blocks for reordering an unordered, possibly gappy stream of
//! numbered elements into its correct order.
//!
//! - [`Sequence`] keeps in-flight elements sorted by a pluggable
//!   [`SequenceElementComparator`] and answers *immediate* neighbour queries:
//!   the nearest element below or above, accepted only when the comparator
//!   says the two are adjacent in the domain's numbering.
//! - [`Timeout`] is a one-shot eviction timer armed against a shared
//!   [`TimerScheduler`]; when it fires, its [`TimeoutHandler`] is told which
//!   deadline elapsed.
//! - [`ResequencerEngine`] composes both into a stream resequencer that
//!   flushes contiguous runs downstream and accepts a gap once an element has
//!   waited longer than the configured timeout.
//!
//! # Examples
//!
//! ```
//! use resequencer_rs::{Sequence, SequenceNumberComparator};
//!
//! let mut sequence = Sequence::new(SequenceNumberComparator::new(|n: &u64| Some(*n)));
//! for n in [5, 6, 8] {
//!     sequence.insert(n);
//! }
//!
//! assert_eq!(sequence.predecessor(&6), Some(5));
//! assert_eq!(sequence.successor(&6), None);
//!
//! sequence.insert(7);
//! assert_eq!(sequence.successor(&6), Some(7));
//! assert_eq!(sequence.predecessor(&8), Some(7));
//! ```

pub mod resequencer;

pub use resequencer::{
    ConfigError, ResequencerConfig, ResequencerEngine, ResequencerError, SequenceElementComparator,
    SequenceNumberComparator, SequenceSender, Sequence, Timeout, TimeoutHandler, TimeoutId,
    TimeoutState, TimerError, TimerScheduler,
};
