/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 15/10/26
******************************************************************************/

//! Stream resequencer engine.
//!
//! [`ResequencerEngine`] owns one [`Sequence`] and arms [`Timeout`]s on a
//! shared [`TimerScheduler`]. An element that has no buffered predecessor
//! and does not continue the delivered run gets an eviction timeout. The
//! smallest buffered element leaves as soon as it has no running timeout:
//! either it never needed one, a predecessor arrived and took over the wait,
//! or its timeout fired and released it across the gap in front of it.
//!
//! All state sits behind one mutex that insertions and timer callbacks share.

use super::comparator::SequenceElementComparator;
use super::config::ResequencerConfig;
use super::error::{ConfigError, ResequencerError};
use super::scheduler::TimerScheduler;
use super::sender::SequenceSender;
use super::sequence::Sequence;
use super::timeout::Timeout;
use std::cmp::Ordering;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace, warn};

/// Per-element bookkeeping shared between the buffer and its timeout handler.
///
/// `timeout` holds the running eviction timeout; it is cleared when the
/// timeout fires or is cancelled.
#[derive(Default)]
struct ElementSlot {
    timeout: Mutex<Option<Timeout>>,
}

/// A buffered element together with its eviction state.
#[derive(Clone)]
struct Element<E> {
    value: E,
    slot: Arc<ElementSlot>,
}

impl<E> Element<E> {
    fn new(value: E) -> Self {
        Self {
            value,
            slot: Arc::new(ElementSlot::default()),
        }
    }

    fn is_waiting(&self) -> bool {
        self.slot
            .timeout
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn attach_timeout(&self, timeout: Timeout) {
        *self
            .slot
            .timeout
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(timeout);
    }

    fn cancel_timeout(&self) -> bool {
        self.slot
            .timeout
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some_and(|timeout| timeout.cancel())
    }
}

/// Ranks [`Element`]s by their values.
struct ElementComparator<C> {
    inner: Arc<C>,
}

impl<E, C: SequenceElementComparator<E>> SequenceElementComparator<Element<E>>
    for ElementComparator<C>
{
    fn compare(&self, a: &Element<E>, b: &Element<E>) -> Ordering {
        self.inner.compare(&a.value, &b.value)
    }

    fn predecessor(&self, a: &Element<E>, b: &Element<E>) -> bool {
        self.inner.predecessor(&a.value, &b.value)
    }

    fn successor(&self, a: &Element<E>, b: &Element<E>) -> bool {
        self.inner.successor(&a.value, &b.value)
    }

    fn is_valid(&self, element: &Element<E>) -> bool {
        self.inner.is_valid(&element.value)
    }
}

struct EngineState<E, C> {
    sequence: Sequence<Element<E>, ElementComparator<C>>,
    last_delivered: Option<E>,
    delivered: u64,
}

struct EngineShared<E, C> {
    config: ResequencerConfig,
    comparator: Arc<C>,
    scheduler: TimerScheduler,
    sender: Box<dyn SequenceSender<E>>,
    state: Mutex<EngineState<E, C>>,
}

/// Reorders a stream of elements and delivers it through a [`SequenceSender`].
///
/// Cloning yields another handle to the same engine.
///
/// # Examples
///
/// ```
/// use resequencer_rs::{ResequencerConfig, ResequencerEngine, SequenceNumberComparator, TimerScheduler};
/// use tokio::sync::mpsc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let (tx, mut rx) = mpsc::unbounded_channel();
/// let engine = ResequencerEngine::new(
///     ResequencerConfig::default(),
///     SequenceNumberComparator::new(|n: &u64| Some(*n)),
///     TimerScheduler::new()?,
///     tx,
/// )?;
///
/// engine.insert(2)?;
/// engine.insert(1)?;
/// // Nothing was delivered yet, so 1 waits for its timeout...
/// assert_eq!(engine.flush(), 2);
/// // ...unless the buffer is flushed.
/// assert_eq!(rx.try_recv()?, 1);
/// assert_eq!(rx.try_recv()?, 2);
/// # Ok(())
/// # }
/// ```
pub struct ResequencerEngine<E, C> {
    shared: Arc<EngineShared<E, C>>,
}

impl<E, C> Clone for ResequencerEngine<E, C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<E, C> ResequencerEngine<E, C>
where
    E: Clone + Send + Sync + 'static,
    C: SequenceElementComparator<E> + Send + Sync + 'static,
{
    /// Creates an engine delivering to `sender`.
    ///
    /// # Errors
    ///
    /// Returns the [`ResequencerConfig::validate`] error for an unusable
    /// configuration.
    pub fn new<S>(
        config: ResequencerConfig,
        comparator: C,
        scheduler: TimerScheduler,
        sender: S,
    ) -> Result<Self, ConfigError>
    where
        S: SequenceSender<E> + 'static,
    {
        config.validate()?;

        let comparator = Arc::new(comparator);
        let sequence = Sequence::new(ElementComparator {
            inner: Arc::clone(&comparator),
        });

        Ok(Self {
            shared: Arc::new(EngineShared {
                config,
                comparator,
                scheduler,
                sender: Box::new(sender),
                state: Mutex::new(EngineState {
                    sequence,
                    last_delivered: None,
                    delivered: 0,
                }),
            }),
        })
    }

    /// Buffers `value` and delivers every element that is now in order.
    ///
    /// Returns `Ok(false)` when the element was dropped: a duplicate of a
    /// buffered element, or invalid with `ignore_invalid` set.
    ///
    /// # Errors
    ///
    /// - [`ResequencerError::InvalidElement`] if the comparator rejects the element
    /// - [`ResequencerError::Rejected`] if `reject_old` is set and the element
    ///   sorts before the last delivered one
    /// - [`ResequencerError::CapacityExceeded`] if the buffer is full
    /// - [`ResequencerError::Timer`] if the eviction timeout cannot be armed
    pub fn insert(&self, value: E) -> Result<bool, ResequencerError> {
        let shared = &self.shared;

        if !shared.comparator.is_valid(&value) {
            if shared.config.ignore_invalid {
                debug!("ignoring invalid element");
                return Ok(false);
            }
            return Err(ResequencerError::InvalidElement);
        }

        let mut state = shared.lock();

        if shared.config.reject_old && shared.precedes_last_delivered(&state, &value) {
            warn!(
                delivered = state.delivered,
                "rejecting element older than the last delivered"
            );
            return Err(ResequencerError::Rejected);
        }

        if state.sequence.len() >= shared.config.capacity {
            return Err(ResequencerError::CapacityExceeded {
                capacity: shared.config.capacity,
            });
        }

        let element = Element::new(value);
        if !state.sequence.insert(element.clone()) {
            debug!("dropping duplicate element");
            return Ok(false);
        }

        if !shared.follows_last_delivered(&state, &element.value)
            && state.sequence.predecessor(&element).is_none()
        {
            if let Err(error) = self.arm(&element) {
                state.sequence.remove(&element);
                return Err(error);
            }
        }

        // The buffered successor no longer waits on a gap, only on this element.
        if let Some(successor) = state.sequence.successor(&element) {
            successor.cancel_timeout();
        }

        trace!(buffered = state.sequence.len(), "element buffered");
        shared.deliver(&mut state);
        Ok(true)
    }

    fn arm(&self, element: &Element<E>) -> Result<(), ResequencerError> {
        let timeout = Timeout::new(&self.shared.scheduler, self.shared.config.timeout());
        let engine = Arc::downgrade(&self.shared);
        let slot = Arc::downgrade(&element.slot);
        timeout.set_handler(move |fired: &Timeout| {
            if let (Some(engine), Some(slot)) = (engine.upgrade(), slot.upgrade()) {
                engine.on_timeout(&slot, fired);
            }
        });
        timeout.schedule()?;
        element.attach_timeout(timeout);
        Ok(())
    }

    /// Delivers every buffered element that is ready and returns how many
    /// were delivered.
    pub fn deliver(&self) -> usize {
        let mut state = self.shared.lock();
        self.shared.deliver(&mut state)
    }

    /// Delivers every buffered element in order, ignoring gaps, and returns
    /// how many were delivered.
    pub fn flush(&self) -> usize {
        let mut state = self.shared.lock();
        let mut count = 0;
        while let Some(element) = state.sequence.pop_first() {
            element.cancel_timeout();
            self.shared.emit(&mut state, element.value);
            count += 1;
        }
        if count > 0 {
            debug!(count, "flushed resequencer buffer");
        }
        count
    }

    /// Cancels the eviction timeouts of all buffered elements.
    ///
    /// Buffered elements stay in place. They no longer wait on a timeout, so
    /// the next insert, [`deliver`](Self::deliver) or [`flush`](Self::flush)
    /// hands them over in order.
    pub fn stop(&self) -> usize {
        let state = self.shared.lock();
        let cancelled = state
            .sequence
            .iter()
            .filter(|element| element.cancel_timeout())
            .count();
        debug!(cancelled, "resequencer stopped");
        cancelled
    }

    /// Returns the number of buffered elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.lock().sequence.len()
    }

    /// Returns `true` if nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.lock().sequence.is_empty()
    }

    /// Returns the most recently delivered element.
    #[must_use]
    pub fn last_delivered(&self) -> Option<E> {
        self.shared.lock().last_delivered.clone()
    }

    /// Returns how many elements have been delivered so far.
    #[must_use]
    pub fn delivered_count(&self) -> u64 {
        self.shared.lock().delivered
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn config(&self) -> &ResequencerConfig {
        &self.shared.config
    }
}

impl<E, C> EngineShared<E, C>
where
    E: Clone + Send + Sync + 'static,
    C: SequenceElementComparator<E> + Send + Sync + 'static,
{
    fn lock(&self) -> MutexGuard<'_, EngineState<E, C>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn follows_last_delivered(&self, state: &EngineState<E, C>, value: &E) -> bool {
        state
            .last_delivered
            .as_ref()
            .is_some_and(|last| self.comparator.successor(value, last))
    }

    fn precedes_last_delivered(&self, state: &EngineState<E, C>, value: &E) -> bool {
        state
            .last_delivered
            .as_ref()
            .is_some_and(|last| self.comparator.compare(value, last) == Ordering::Less)
    }

    fn on_timeout(&self, slot: &ElementSlot, fired: &Timeout) {
        let mut state = self.lock();
        slot.timeout
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        debug!(timeout = %fired.id(), "eviction timeout elapsed, releasing element");
        self.deliver(&mut state);
    }

    fn deliver(&self, state: &mut EngineState<E, C>) -> usize {
        let mut count = 0;
        while let Some(head) = state.sequence.first() {
            if head.is_waiting() && !self.follows_last_delivered(state, &head.value) {
                break;
            }
            state.sequence.remove(&head);
            head.cancel_timeout();
            self.emit(state, head.value);
            count += 1;
        }
        count
    }

    fn emit(&self, state: &mut EngineState<E, C>, value: E) {
        state.last_delivered = Some(value.clone());
        state.delivered += 1;
        trace!(delivered = state.delivered, "element delivered");
        self.sender.send(value);
    }
}

impl<E, C> fmt::Debug for ResequencerEngine<E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResequencerEngine")
            .field("config", &self.shared.config)
            .field("scheduler", &self.shared.scheduler)
            .finish_non_exhaustive()
    }
}
