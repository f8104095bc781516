/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 15/10/26
******************************************************************************/

//! One-shot eviction timeouts.
//!
//! A [`Timeout`] is armed once against a shared
//! [`TimerScheduler`](super::TimerScheduler) and either fires exactly once or
//! is cancelled. It never re-arms: a new deadline needs a new `Timeout`.
//!
//! ```text
//! Created ──schedule──▶ Scheduled ──delay elapsed──▶ Fired
//!    │                      │
//!    └──────cancel──────────┴──────────cancel──────▶ Cancelled
//! ```

use super::error::TimerError;
use super::scheduler::TimerScheduler;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Identifier of a timeout, unique within its scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeoutId(pub(crate) u64);

impl TimeoutId {
    /// Returns the raw identifier.
    #[inline]
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimeoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state of a [`Timeout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TimeoutState {
    /// Constructed but not armed.
    Created = 0,
    /// Armed and waiting for its delay to elapse.
    Scheduled = 1,
    /// The delay elapsed and the handler was invoked.
    Fired = 2,
    /// Cancelled before firing.
    Cancelled = 3,
}

impl TimeoutState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Created,
            1 => Self::Scheduled,
            2 => Self::Fired,
            _ => Self::Cancelled,
        }
    }

    /// Returns `true` for [`Fired`](Self::Fired) and [`Cancelled`](Self::Cancelled).
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Fired | Self::Cancelled)
    }
}

/// Callback invoked when a [`Timeout`] fires.
///
/// The fired timeout is passed in so an owner tracking several deadlines can
/// tell which one elapsed. Handlers run on the scheduler's runtime and
/// should not panic; a panic is caught and logged by the scheduler.
///
/// Any `Fn(&Timeout) + Send + Sync` closure is a handler.
pub trait TimeoutHandler: Send + Sync {
    /// Called once when `timeout` fires.
    fn timeout(&self, timeout: &Timeout);
}

impl<F> TimeoutHandler for F
where
    F: Fn(&Timeout) + Send + Sync,
{
    fn timeout(&self, timeout: &Timeout) {
        self(timeout)
    }
}

struct TimeoutInner {
    id: TimeoutId,
    delay: Duration,
    scheduler: TimerScheduler,
    handler: Mutex<Option<Arc<dyn TimeoutHandler>>>,
    state: AtomicU8,
}

/// A one-shot deadline on a shared [`TimerScheduler`].
///
/// Clones refer to the same deadline.
///
/// # Examples
///
/// ```
/// use resequencer_rs::{Timeout, TimeoutState, TimerScheduler};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let scheduler = TimerScheduler::new()?;
/// let timeout = Timeout::new(&scheduler, Duration::from_millis(100));
/// timeout.set_handler(|fired: &Timeout| {
///     println!("timeout {} elapsed", fired.id());
/// });
/// timeout.schedule()?;
/// assert_eq!(timeout.state(), TimeoutState::Scheduled);
///
/// assert!(timeout.cancel());
/// assert_eq!(timeout.state(), TimeoutState::Cancelled);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Timeout {
    inner: Arc<TimeoutInner>,
}

impl Timeout {
    /// Creates an inert timeout that will fire `delay` after it is scheduled.
    #[must_use]
    pub fn new(scheduler: &TimerScheduler, delay: Duration) -> Self {
        Self {
            inner: Arc::new(TimeoutInner {
                id: scheduler.next_id(),
                delay,
                scheduler: scheduler.clone(),
                handler: Mutex::new(None),
                state: AtomicU8::new(TimeoutState::Created as u8),
            }),
        }
    }

    /// Returns this timeout's identifier.
    #[inline]
    #[must_use]
    pub fn id(&self) -> TimeoutId {
        self.inner.id
    }

    /// Returns the configured delay.
    #[inline]
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.inner.delay
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> TimeoutState {
        TimeoutState::from_u8(self.inner.state.load(Ordering::Acquire))
    }

    /// Returns `true` while armed and not yet fired or cancelled.
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.state() == TimeoutState::Scheduled
    }

    /// Registers the handler invoked on expiry, replacing any previous one.
    pub fn set_handler<H>(&self, handler: H)
    where
        H: TimeoutHandler + 'static,
    {
        *self
            .inner
            .handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(handler));
    }

    fn handler(&self) -> Option<Arc<dyn TimeoutHandler>> {
        self.inner
            .handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Arms the timeout on its scheduler.
    ///
    /// The delay starts now. A timeout can be scheduled once; allocate a new
    /// one for the next deadline.
    ///
    /// # Errors
    ///
    /// - [`TimerError::MissingHandler`] if no handler was registered
    /// - [`TimerError::AlreadyScheduled`] if the timeout left the created state
    pub fn schedule(&self) -> Result<(), TimerError> {
        if self.handler().is_none() {
            return Err(TimerError::MissingHandler { id: self.id() });
        }

        let id = self.id();
        let scheduler = &self.inner.scheduler;

        // Pending before Scheduled, so a cancel that sees Scheduled always
        // finds the slot.
        if !scheduler.reserve(id) {
            return Err(TimerError::AlreadyScheduled {
                id,
                state: self.state(),
            });
        }

        if let Err(state) = self.inner.state.compare_exchange(
            TimeoutState::Created as u8,
            TimeoutState::Scheduled as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            scheduler.release(id);
            return Err(TimerError::AlreadyScheduled {
                id,
                state: TimeoutState::from_u8(state),
            });
        }

        let timeout = self.clone();
        scheduler.spawn(id, self.delay(), move || timeout.fire());
        Ok(())
    }

    /// Cancels the timeout.
    ///
    /// Returns `true` if it was armed and will now not fire. A timeout that
    /// was never scheduled moves to the cancelled state and returns `false`.
    pub fn cancel(&self) -> bool {
        if self
            .inner
            .state
            .compare_exchange(
                TimeoutState::Created as u8,
                TimeoutState::Cancelled as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
        {
            return false;
        }

        if self.inner.scheduler.cancel(self.id()) {
            self.inner
                .state
                .store(TimeoutState::Cancelled as u8, Ordering::Release);
            return true;
        }
        false
    }

    fn fire(&self) {
        self.inner
            .state
            .store(TimeoutState::Fired as u8, Ordering::Release);
        if let Some(handler) = self.handler() {
            handler.timeout(self);
        }
    }
}

impl fmt::Debug for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeout")
            .field("id", &self.id())
            .field("delay", &self.delay())
            .field("state", &self.state())
            .finish()
    }
}
