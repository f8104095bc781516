/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 15/10/26
******************************************************************************/

//! Error types for timeouts, configuration and the resequencer engine.
//!
//! An absent neighbour is never an error: [`Sequence`](super::Sequence)
//! queries return `None` for it.

use super::timeout::{TimeoutId, TimeoutState};
use thiserror::Error;

/// Errors raised when arming or managing a [`Timeout`](super::Timeout).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// `schedule` was called before a handler was registered.
    #[error("timeout {id} has no handler registered")]
    MissingHandler {
        /// The timeout that was scheduled.
        id: TimeoutId,
    },

    /// `schedule` was called on a timeout that already left the created state.
    #[error("timeout {id} cannot be scheduled from state {state:?}")]
    AlreadyScheduled {
        /// The timeout that was scheduled.
        id: TimeoutId,
        /// Its state at the time of the call.
        state: TimeoutState,
    },

    /// No tokio runtime is available to drive the scheduler.
    #[error("no tokio runtime available for the timer scheduler")]
    NoRuntime,
}

/// Errors raised by [`ResequencerConfig::validate`](super::ResequencerConfig::validate).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The buffer capacity must be at least one element.
    #[error("capacity must be greater than zero")]
    ZeroCapacity,

    /// The eviction timeout must be at least one millisecond.
    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    /// The configuration document could not be parsed.
    #[error("invalid resequencer configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised by [`ResequencerEngine::insert`](super::ResequencerEngine::insert).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResequencerError {
    /// The comparator rejected the element as unplaceable.
    #[error("element is not valid for resequencing")]
    InvalidElement,

    /// The element sorts before one that was already delivered.
    #[error("element is older than the last delivered element")]
    Rejected,

    /// The buffer is full; retry after the next delivery.
    #[error("resequencer buffer is full (capacity {capacity})")]
    CapacityExceeded {
        /// The configured capacity.
        capacity: usize,
    },

    /// Arming the element's eviction timeout failed.
    #[error("failed to arm eviction timeout: {0}")]
    Timer(#[from] TimerError),
}
