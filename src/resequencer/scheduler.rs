/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 15/10/26
******************************************************************************/

//! Shared scheduling facility for one-shot timeouts.
//!
//! A single [`TimerScheduler`] serves every [`Timeout`](super::Timeout) of a
//! process. Each armed timeout becomes one delayed task on a tokio runtime;
//! the scheduler tracks the pending ones in a concurrent map so that firing
//! and cancellation can race from different threads without a timeout ever
//! firing twice or firing after it was cancelled.

use super::error::TimerError;
use super::timeout::TimeoutId;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::{debug, error, trace};

struct SchedulerInner {
    runtime: Handle,
    /// Armed timeouts. The slot is `None` until the delay task is spawned.
    pending: DashMap<TimeoutId, Option<AbortHandle>>,
    next_id: AtomicU64,
}

/// Process-wide clock that fires one-shot timeouts.
///
/// Cloning is cheap and every clone drives the same set of pending
/// timeouts, so many resequencer streams can share one scheduler.
///
/// # Examples
///
/// ```
/// use resequencer_rs::TimerScheduler;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let scheduler = TimerScheduler::new()?;
/// let id = scheduler.next_id();
/// scheduler.schedule(id, Duration::from_secs(60), || {});
///
/// assert!(scheduler.is_pending(id));
/// assert!(scheduler.cancel(id));
/// assert!(!scheduler.cancel(id));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TimerScheduler {
    inner: Arc<SchedulerInner>,
}

impl TimerScheduler {
    /// Creates a scheduler on the tokio runtime of the calling context.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::NoRuntime`] when called outside a tokio runtime.
    pub fn new() -> Result<Self, TimerError> {
        Handle::try_current()
            .map(Self::with_handle)
            .map_err(|_| TimerError::NoRuntime)
    }

    /// Creates a scheduler that spawns its delay tasks on `runtime`.
    ///
    /// The runtime must have its time driver enabled.
    #[must_use]
    pub fn with_handle(runtime: Handle) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                runtime,
                pending: DashMap::new(),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Allocates a fresh timeout identifier, unique for this scheduler.
    #[must_use]
    pub fn next_id(&self) -> TimeoutId {
        TimeoutId(self.inner.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Runs `task` once after `delay`, unless `id` is cancelled first.
    ///
    /// The delay is measured from this call. Returns immediately. A panic
    /// raised by `task` is caught and logged; it does not affect other
    /// timeouts.
    pub fn schedule<F>(&self, id: TimeoutId, delay: Duration, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.pending.insert(id, None);
        self.spawn(id, delay, task);
    }

    /// Marks `id` as pending without starting its delay.
    ///
    /// Returns `false` if `id` is already pending. From here on
    /// [`cancel`](Self::cancel) succeeds for `id`, even before
    /// [`spawn`](Self::spawn) runs.
    pub(crate) fn reserve(&self, id: TimeoutId) -> bool {
        match self.inner.pending.entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(None);
                true
            }
        }
    }

    /// Drops a reservation that will never be spawned.
    pub(crate) fn release(&self, id: TimeoutId) {
        self.inner.pending.remove(&id);
    }

    /// Starts the delay task of the reserved timeout `id`.
    pub(crate) fn spawn<F>(&self, id: TimeoutId, delay: Duration, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        // Dropped with the future, also when the runtime refuses the task.
        let guard = PendingGuard {
            inner: Arc::clone(&self.inner),
            id,
        };
        let handle = self.inner.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if guard.inner.pending.remove(&guard.id).is_none() {
                return;
            }
            trace!(id = %guard.id, "timeout fired");
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
                error!(id = %guard.id, reason = panic_message(payload.as_ref()), "timeout handler panicked");
            }
        });

        // A cancel that won the race already removed the slot.
        match self.inner.pending.get_mut(&id) {
            Some(mut slot) => *slot = Some(handle.abort_handle()),
            None => handle.abort(),
        }
        trace!(%id, delay_ms = delay.as_millis() as u64, "timeout scheduled");
    }

    /// Cancels the pending timeout `id`.
    ///
    /// Returns `true` if it was pending, in which case it will not fire.
    /// Returns `false` if it already fired, was already cancelled, or was
    /// never scheduled here.
    pub fn cancel(&self, id: TimeoutId) -> bool {
        match self.inner.pending.remove(&id) {
            Some((_, slot)) => {
                if let Some(abort) = slot {
                    abort.abort();
                }
                debug!(%id, "timeout cancelled");
                true
            }
            None => false,
        }
    }

    /// Returns `true` if `id` is armed and has neither fired nor been cancelled.
    #[must_use]
    pub fn is_pending(&self, id: TimeoutId) -> bool {
        self.inner.pending.contains_key(&id)
    }

    /// Returns the number of armed timeouts.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.pending.len()
    }

    /// Cancels every pending timeout and returns how many were cancelled.
    ///
    /// The scheduler stays usable afterwards.
    pub fn shutdown(&self) -> usize {
        let ids: Vec<TimeoutId> = self.inner.pending.iter().map(|slot| *slot.key()).collect();
        let cancelled = ids.into_iter().filter(|id| self.cancel(*id)).count();
        debug!(cancelled, "timer scheduler shut down");
        cancelled
    }
}

impl fmt::Debug for TimerScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerScheduler")
            .field("pending", &self.inner.pending.len())
            .finish()
    }
}

/// Clears the pending slot of a delay task when the task goes away.
struct PendingGuard {
    inner: Arc<SchedulerInner>,
    id: TimeoutId,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.inner.pending.remove(&self.id);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
