/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 15/10/26
******************************************************************************/

//! Resequencer module for restoring the order of out-of-order streams.
//!
//! This module provides the ordered [`Sequence`] set with immediate
//! predecessor/successor queries, one-shot eviction [`Timeout`]s driven by a
//! shared [`TimerScheduler`], and the [`ResequencerEngine`] that composes
//! them into a stream resequencer.
//!
//! # Architecture
//!
//! - Elements are buffered in a [`Sequence`] sorted by a
//!   [`SequenceElementComparator`]
//! - An element continuing the delivered run is delivered immediately,
//!   together with every buffered element that follows it without a gap
//! - An element with neither a delivered nor a buffered predecessor waits at
//!   most the configured timeout before it is released despite the gap
//! - Timeouts fire on the scheduler's tokio runtime; the engine serializes
//!   them with insertions under one lock
//!
//! # Examples
//!
//! ```no_run
//! use resequencer_rs::resequencer::{ResequencerConfig, ResequencerEngine, TimerScheduler};
//! use resequencer_rs::SequenceNumberComparator;
//! use std::time::Duration;
//! use tokio::sync::mpsc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let scheduler = TimerScheduler::new()?;
//! let (tx, mut rx) = mpsc::unbounded_channel();
//! let config = ResequencerConfig::default().with_timeout(Duration::from_millis(250));
//! let engine = ResequencerEngine::new(
//!     config,
//!     SequenceNumberComparator::new(|n: &u64| Some(*n)),
//!     scheduler,
//!     tx,
//! )?;
//!
//! for n in [3, 1, 2, 5] {
//!     engine.insert(n)?;
//! }
//!
//! // 1, 2 and 3 leave after 1's timeout; 5 after its own, accepting the gap at 4.
//! while let Some(n) = rx.recv().await {
//!     println!("{n}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod comparator;
pub mod config;
pub mod engine;
pub mod error;
pub mod scheduler;
pub mod sender;
pub mod sequence;
pub mod timeout;

#[cfg(test)]
mod tests;

// Re-export main types
pub use comparator::{SequenceElementComparator, SequenceNumberComparator};
pub use config::ResequencerConfig;
pub use engine::ResequencerEngine;
pub use error::{ConfigError, ResequencerError, TimerError};
pub use scheduler::TimerScheduler;
pub use sender::SequenceSender;
pub use sequence::Sequence;
pub use timeout::{Timeout, TimeoutHandler, TimeoutId, TimeoutState};
